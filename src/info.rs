use crate::error::ParseError;
use crate::packet::{PacketType, ResponsePacket};
use crate::parse::{get_i16, get_string, get_u8};

/// Kind of server, from the single-character code in A2S_INFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerType {
    /// `d`
    Dedicated,
    /// `l`, non-dedicated
    Listen,
    /// `p`, SourceTV relay
    Proxy,
    /// Anything else, passed through untouched.
    RawCode(u8),
}

impl From<u8> for ServerType {
    fn from(code: u8) -> Self {
        match code {
            b'd' => ServerType::Dedicated,
            b'l' => ServerType::Listen,
            b'p' => ServerType::Proxy,
            n => ServerType::RawCode(n),
        }
    }
}

/// Server environment, from the single-character code in A2S_INFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingSystem {
    /// `w`
    Windows,
    /// `l`
    Linux,
    /// `m` or `o`
    MacOs,
    /// Anything else, passed through untouched.
    RawCode(u8),
}

impl From<u8> for OperatingSystem {
    fn from(code: u8) -> Self {
        match code {
            b'w' => OperatingSystem::Windows,
            b'l' => OperatingSystem::Linux,
            b'm' | b'o' => OperatingSystem::MacOs,
            n => OperatingSystem::RawCode(n),
        }
    }
}

/// Server information as obtained by [crate::query::A2sClient::info].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    /// A2S_INFO protocol version
    pub protocol: u8,
    /// Server hostname
    pub name: String,
    /// Current map
    pub map: String,
    /// Location of server files
    pub folder: String,
    /// Name of game
    pub game: String,
    /// Steam ID of game
    pub game_id: i16,
    /// Current players
    pub current_players: u8,
    /// Max players
    pub max_players: u8,
    /// Current bots
    pub bots: u8,
    pub server_type: ServerType,
    pub operating_system: OperatingSystem,
    /// Is the server password protected?
    pub passworded: bool,
    /// Is the server VAC enabled?
    pub vac_enabled: bool,
    /// Game version
    pub version: String,
}

impl ServerInfo {
    /// Parse a [ResponsePacket] into its corresponding [ServerInfo].
    ///
    /// The extra data flag and everything after it is ignored.
    pub fn parse(packet: &ResponsePacket) -> Result<ServerInfo, ParseError> {
        packet.expect_type(PacketType::InfoResponse)?;
        let data = packet.body();
        let mut offset = 0;

        let protocol = get_u8(data, &mut offset)?;
        let name = get_string(data, &mut offset)?;
        let map = get_string(data, &mut offset)?;
        let folder = get_string(data, &mut offset)?;
        let game = get_string(data, &mut offset)?;
        let game_id = get_i16(data, &mut offset)?;
        let current_players = get_u8(data, &mut offset)?;
        let max_players = get_u8(data, &mut offset)?;
        let bots = get_u8(data, &mut offset)?;
        let server_type = ServerType::from(get_u8(data, &mut offset)?);
        let operating_system = OperatingSystem::from(get_u8(data, &mut offset)?);
        let passworded = get_u8(data, &mut offset)? == 1;
        let vac_enabled = get_u8(data, &mut offset)? == 1;
        let version = get_string(data, &mut offset)?;

        Ok(ServerInfo {
            protocol,
            name,
            map,
            folder,
            game,
            game_id,
            current_players,
            max_players,
            bots,
            server_type,
            operating_system,
            passworded,
            vac_enabled,
            version,
        })
    }
}
