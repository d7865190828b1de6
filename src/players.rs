use log::warn;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::error::ParseError;
use crate::packet::{PacketType, ResponsePacket};
use crate::parse::{get_f32, get_i32, get_string, get_u8};

const SECONDS_PER_DAY: i64 = 86_400;

/// One connected player from an A2S_PLAYER reply.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    /// Per-record leading byte. Most servers send 0 for every player.
    pub index: u8,
    /// Player name, trimmed. Can be empty while a player is connecting.
    pub name: String,
    pub score: i32,
    /// Time connected in seconds.
    pub duration_secs: f32,
    /// `duration_secs` rendered as `HH:MM:SS`.
    pub duration: String,
}

/// Render seconds as the `HH:MM:SS` wall-clock time that long after the Unix epoch (UTC).
///
/// Fractions are dropped and the result wraps every 24 hours.
pub fn format_duration(seconds: f32) -> Result<String, ParseError> {
    let whole = if seconds.is_finite() {
        seconds.floor() as i64
    } else {
        0
    };
    let clock =
        OffsetDateTime::UNIX_EPOCH + time::Duration::seconds(whole.rem_euclid(SECONDS_PER_DAY));
    Ok(clock.format(format_description!("[hour]:[minute]:[second]"))?)
}

fn parse_record(data: &[u8], offset: &mut usize) -> Result<PlayerRecord, ParseError> {
    let index = get_u8(data, offset)?;
    let name = get_string(data, offset)?.trim().to_string();
    let score = get_i32(data, offset)?;
    let duration_secs = get_f32(data, offset)?;
    let duration = format_duration(duration_secs)?;

    Ok(PlayerRecord {
        index,
        name,
        score,
        duration_secs,
        duration,
    })
}

/// Parse an A2S_PLAYER [ResponsePacket].
///
/// The player count byte is skipped; records are decoded until the payload
/// runs out. A malformed record ends decoding and the records before it are
/// returned.
pub fn parse(packet: &ResponsePacket) -> Result<Vec<PlayerRecord>, ParseError> {
    packet.expect_type(PacketType::PlayerResponse)?;
    let data = packet.body();
    let mut offset = 0;
    let _count = get_u8(data, &mut offset)?;

    let mut players = Vec::new();
    while offset < data.len() {
        let start = offset;
        match parse_record(data, &mut offset) {
            Ok(player) => players.push(player),
            Err(e) => {
                warn!(
                    "stopped reading players after {} record(s) at offset {}: {}",
                    players.len(),
                    start,
                    e
                );
                break;
            }
        }
    }

    Ok(players)
}
