//! Entities for the replay fixtures.

use tikmap_api::Entity;

/// `/interface/print`
#[derive(Entity, Default, Debug, Clone, PartialEq)]
pub struct Interface {
    #[field(key = ".id", mandatory)]
    pub id: String,

    #[field(mandatory)]
    pub name: String,

    #[field(key = "type")]
    pub kind: String,

    #[field]
    pub mtu: Option<String>,

    #[field]
    pub mac_address: Option<String>,

    #[field(default = "false")]
    pub running: bool,

    #[field(default = "false")]
    pub disabled: bool,

    #[field]
    pub comment: Option<String>,
}

/// `/ip/address/print`
#[derive(Entity, Default, Debug, Clone, PartialEq)]
pub struct IpAddress {
    #[field(key = ".id", mandatory)]
    pub id: String,

    #[field(mandatory)]
    pub address: String,

    #[field]
    pub network: Option<String>,

    #[field(mandatory)]
    pub interface: String,

    #[field(default = "false")]
    pub dynamic: bool,

    #[field(default = "false")]
    pub disabled: bool,
}

/// `/system/resource/print`
#[derive(Entity, Default, Debug, Clone, PartialEq)]
pub struct SystemResource {
    #[field(mandatory)]
    pub uptime: String,

    #[field(mandatory)]
    pub version: String,

    #[field(default = "0")]
    pub cpu_load: u32,

    #[field(default = "0")]
    pub free_memory: u64,

    #[field(default = "0")]
    pub total_memory: u64,

    #[field]
    pub board_name: Option<String>,
}
