use std::ops::Index;

use crate::error::ParseError;
use crate::packet::{PacketType, ResponsePacket};
use crate::parse::get_string;

/// Rule name to rule value, in the order the server listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RulesMap {
    entries: Vec<(String, String)>,
}

impl RulesMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`. A name already present keeps its position.
    pub fn insert(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl Index<&str> for RulesMap {
    type Output = String;

    /// Panics if `name` is not a rule.
    fn index(&self, name: &str) -> &String {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .unwrap_or_else(|| panic!("no rule named {:?}", name))
    }
}

impl IntoIterator for RulesMap {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Rule count field, skipped: the strings that follow decide how many rules there are.
const COUNT_LEN: usize = 2;

/// Parse an A2S_RULES [ResponsePacket].
///
/// Every terminated string after the count is read and consecutive strings
/// are paired into name/value. A name seen twice keeps its first position
/// and its last value.
pub fn parse(packet: &ResponsePacket) -> Result<RulesMap, ParseError> {
    packet.expect_type(PacketType::RulesResponse)?;
    let data = packet.body();
    if data.len() < COUNT_LEN {
        return Err(ParseError::Truncated(data.len()));
    }

    let mut offset = COUNT_LEN;
    let mut strings = Vec::new();
    while offset < data.len() {
        strings.push(get_string(data, &mut offset)?);
    }
    if strings.len() % 2 != 0 {
        return Err(ParseError::OddRuleCount(strings.len()));
    }

    let mut rules = RulesMap::new();
    let mut strings = strings.into_iter();
    while let (Some(name), Some(value)) = (strings.next(), strings.next()) {
        rules.insert(name, value);
    }

    Ok(rules)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn rules_reply(rules: &[(&str, &str)]) -> Vec<u8> {
        let mut raw = vec![0xff, 0xff, 0xff, 0xff, 0x45];
        raw.extend_from_slice(&(rules.len() as u16).to_le_bytes());
        for (name, value) in rules {
            raw.extend_from_slice(name.as_bytes());
            raw.push(0);
            raw.extend_from_slice(value.as_bytes());
            raw.push(0);
        }
        raw
    }

    fn parse_raw(raw: &[u8]) -> Result<RulesMap, ParseError> {
        parse(&ResponsePacket::unpack(raw)?)
    }

    #[test]
    fn decodes_pairs() {
        let rules = parse_raw(&rules_reply(&[
            ("GameDifficulty", "2"),
            ("MaxPlayers", "8"),
            ("ServerDescription", ""),
        ]))
        .unwrap();

        assert_eq!(rules.len(), 3);
        assert_eq!(rules["GameDifficulty"], "2");
        assert_eq!(rules["MaxPlayers"], "8");
        assert_eq!(rules["ServerDescription"], "");
    }

    #[test]
    fn last_duplicate_wins() {
        let rules = parse_raw(&rules_reply(&[("a", "1"), ("b", "2"), ("a", "3")])).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules["a"], "3");
    }

    #[test]
    fn keeps_server_order() {
        let rules = parse_raw(&rules_reply(&[
            ("ZombieMove", "0"),
            ("BloodMoonFrequency", "7"),
            ("MaxPlayers", "8"),
            ("BloodMoonFrequency", "14"),
        ]))
        .unwrap();

        let names: Vec<&str> = rules.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["ZombieMove", "BloodMoonFrequency", "MaxPlayers"]);
        assert_eq!(rules.get("BloodMoonFrequency"), Some("14"));
        assert_eq!(rules.get("Missing"), None);

        let owned: Vec<(String, String)> = rules.into_iter().collect();
        assert_eq!(owned[2], ("MaxPlayers".to_string(), "8".to_string()));
    }

    #[test]
    fn no_rules() {
        assert!(parse_raw(&rules_reply(&[])).unwrap().is_empty());
    }

    #[test]
    fn dangling_name_fails() {
        let mut raw = rules_reply(&[("a", "1")]);
        raw.extend_from_slice(b"orphan\0");
        assert!(matches!(parse_raw(&raw), Err(ParseError::OddRuleCount(3))));
    }

    #[test]
    fn unterminated_value_fails() {
        let mut raw = rules_reply(&[("a", "1")]);
        raw.extend_from_slice(b"b\0tw");
        assert!(matches!(parse_raw(&raw), Err(ParseError::Truncated(_))));
    }
}
