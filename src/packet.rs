use std::ops::Range;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketHeader {
    Single,
    Split,
}

/// Convert an i32 into a [PacketHeader].
impl TryFrom<i32> for PacketHeader {
    type Error = ParseError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(PacketHeader::Single),
            -2 => Ok(PacketHeader::Split),
            n => Err(ParseError::UnknownPacketHeader(n)),
        }
    }
}

/// For packing a [PacketHeader] into a packet in [RequestPacket::pack].
impl PacketHeader {
    pub fn to_le_bytes(self) -> [u8; 4] {
        let type_value: i32 = match self {
            PacketHeader::Single => -1,
            PacketHeader::Split => -2,
        };
        type_value.to_le_bytes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    /// A2S_INFO request -- https://developer.valvesoftware.com/wiki/Server_queries#A2S_INFO
    InfoRequest,
    /// A2S_PLAYER request -- https://developer.valvesoftware.com/wiki/Server_queries#A2S_PLAYER
    PlayerRequest,
    /// A2S_RULES request -- https://developer.valvesoftware.com/wiki/Server_queries#A2S_RULES
    RulesRequest,
    /// S2C_CHALLENGE
    ///
    /// The server may reply with a challenge ('A' or 0x41). In that case the
    /// client repeats the request carrying the challenge number.
    Challenge,
    /// A2S_INFO response, parsed by [crate::info::ServerInfo::parse].
    InfoResponse,
    /// A2S_PLAYER response, parsed by [crate::players::parse].
    PlayerResponse,
    /// A2S_RULES response, parsed by [crate::rules::parse].
    RulesResponse,
}

/// Convert a u8 into a [PacketType].
impl TryFrom<u8> for PacketType {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x54 => Ok(PacketType::InfoRequest),
            0x55 => Ok(PacketType::PlayerRequest),
            0x56 => Ok(PacketType::RulesRequest),
            0x41 => Ok(PacketType::Challenge),
            0x49 => Ok(PacketType::InfoResponse),
            0x44 => Ok(PacketType::PlayerResponse),
            0x45 => Ok(PacketType::RulesResponse),
            n => Err(ParseError::UnknownPacketType(n)),
        }
    }
}

impl PacketType {
    pub fn to_byte(self) -> u8 {
        match self {
            PacketType::InfoRequest => 0x54,
            PacketType::PlayerRequest => 0x55,
            PacketType::RulesRequest => 0x56,
            PacketType::Challenge => 0x41,
            PacketType::InfoResponse => 0x49,
            PacketType::PlayerResponse => 0x44,
            PacketType::RulesResponse => 0x45,
        }
    }
}

/// Challenge number handed out by the server, echoed back verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeToken(pub i32);

impl ChallengeToken {
    /// Sent by players and rules requests that have not been challenged yet.
    pub const PLACEHOLDER: ChallengeToken = ChallengeToken(-1);

    pub fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPacket {
    packet_header: PacketHeader,
    packet_type: PacketType,
    body: Vec<u8>,
    challenge: Option<ChallengeToken>,
}

impl RequestPacket {
    const INFO_BODY: &'static str = "Source Engine Query";

    /// A2S_INFO. The challenge is only appended when the server asked for one.
    pub fn info(challenge: Option<ChallengeToken>) -> Self {
        let mut body = Self::INFO_BODY.as_bytes().to_vec();
        // null terminate the body
        body.push(0);
        RequestPacket {
            packet_header: PacketHeader::Single,
            packet_type: PacketType::InfoRequest,
            body,
            challenge,
        }
    }

    /// A2S_PLAYER, carrying `challenge` or the placeholder.
    pub fn players(challenge: Option<ChallengeToken>) -> Self {
        Self::challenged(PacketType::PlayerRequest, challenge)
    }

    /// A2S_RULES, carrying `challenge` or the placeholder.
    pub fn rules(challenge: Option<ChallengeToken>) -> Self {
        Self::challenged(PacketType::RulesRequest, challenge)
    }

    fn challenged(packet_type: PacketType, challenge: Option<ChallengeToken>) -> Self {
        RequestPacket {
            packet_header: PacketHeader::Single,
            packet_type,
            body: Vec::new(),
            challenge: Some(challenge.unwrap_or(ChallengeToken::PLACEHOLDER)),
        }
    }

    /// The same request, answering the server's challenge.
    pub fn with_challenge(&self, challenge: ChallengeToken) -> Self {
        RequestPacket {
            challenge: Some(challenge),
            ..self.clone()
        }
    }

    /// Serializes a request packet into an array of bytes.
    pub fn pack(&self) -> Vec<u8> {
        // packet structure: header, type, body (and challenge)
        let mut payload: Vec<u8> = Vec::with_capacity(5 + self.body.len() + 4);
        payload.extend_from_slice(&self.packet_header.to_le_bytes());
        payload.push(self.packet_type.to_byte());
        payload.extend_from_slice(&self.body);
        if let Some(c) = self.challenge {
            payload.extend_from_slice(&c.to_le_bytes());
        }

        payload
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePacket {
    packet_type: PacketType,
    body: Vec<u8>,
}

impl ResponsePacket {
    const HEADER_RANGE: Range<usize> = 0..4;
    const SINGLE_TYPE_OFFSET: usize = 4;
    const SINGLE_BODY_OFFSET: usize = 5;
    const CHALLENGE_LEN: usize = 4;

    /// Deserializes an incoming packet, splitting it up into headers and body.
    pub fn unpack(incoming: &[u8]) -> Result<Self, ParseError> {
        let raw_header = incoming
            .get(Self::HEADER_RANGE)
            .ok_or(ParseError::Truncated(incoming.len()))?;
        let packet_header = PacketHeader::try_from(LittleEndian::read_i32(raw_header))?;

        match packet_header {
            PacketHeader::Single => {
                let raw_type = *incoming
                    .get(Self::SINGLE_TYPE_OFFSET)
                    .ok_or(ParseError::Truncated(incoming.len()))?;
                let packet_type = PacketType::try_from(raw_type)?;
                let body = incoming[Self::SINGLE_BODY_OFFSET..].to_vec();

                if packet_type == PacketType::Challenge && body.len() < Self::CHALLENGE_LEN {
                    return Err(ParseError::Truncated(incoming.len()));
                }

                Ok(ResponsePacket {
                    packet_type,
                    body,
                })
            }
            PacketHeader::Split => Err(ParseError::SplitPacket),
        }
    }

    pub fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    /// Payload after the header and type byte.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The challenge number, if this packet is a challenge.
    pub fn challenge(&self) -> Option<ChallengeToken> {
        if self.packet_type != PacketType::Challenge {
            return None;
        }
        self.body
            .get(..Self::CHALLENGE_LEN)
            .map(|raw| ChallengeToken(LittleEndian::read_i32(raw)))
    }

    /// Fail unless this packet is of type `expected`.
    pub fn expect_type(&self, expected: PacketType) -> Result<(), ParseError> {
        if self.packet_type == expected {
            Ok(())
        } else {
            Err(ParseError::WrongPacketType {
                expected: expected.to_byte(),
                got: self.packet_type.to_byte(),
            })
        }
    }
}
