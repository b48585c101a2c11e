use serde::{Deserialize, Serialize};

pub const SEASON_CODE_LEN: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageInfo {
    pub count: u32,
    pub pages: u32,
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// Raw list response of the upstream API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing<T> {
    pub info: PageInfo,
    pub results: Vec<T>,
}

/// One page as the view layer sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub total_pages: u32,
    pub count: u32,
}

impl<T> From<Listing<T>> for Page<T> {
    fn from(l: Listing<T>) -> Self {
        Self {
            results: l.results,
            total_pages: l.info.pages,
            count: l.info.count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedLink {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Character {
    pub id: i32,
    pub name: String,
    pub status: String,
    pub species: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    pub gender: String,
    #[serde(default)]
    pub origin: Option<NamedLink>,
    #[serde(default)]
    pub location: Option<NamedLink>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub episode: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub created: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub air_date: String,
    /// Season/episode code such as `S01E07`.
    pub episode: String,
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub created: String,
}

impl Episode {
    /// `S01E07` -> `S01`.
    pub fn season_code(&self) -> &str {
        season_code(&self.episode)
    }
}

pub fn season_code(code: &str) -> &str {
    match code.char_indices().nth(SEASON_CODE_LEN) {
        Some((idx, _)) => &code[..idx],
        None => code,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: i32,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub dimension: String,
    #[serde(default)]
    pub residents: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub created: String,
}

/// By-id endpoints answer with an object for one id and an array for several.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(v: OneOrMany<T>) -> Self {
        match v {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Character list filters; unset fields are left out of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterFilter {
    pub name: Option<String>,
    pub status: Option<String>,
    pub species: Option<String>,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeFilter {
    pub name: Option<String>,
    pub episode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationFilter {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub dimension: Option<String>,
}

/// Turns a filter into query pairs, skipping blank values.
pub trait QueryFilter {
    fn pairs(&self) -> Vec<(&'static str, String)>;
}

fn push_set(out: &mut Vec<(&'static str, String)>, key: &'static str, value: &Option<String>) {
    if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        out.push((key, v.to_string()));
    }
}

impl QueryFilter for CharacterFilter {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        push_set(&mut out, "name", &self.name);
        push_set(&mut out, "status", &self.status);
        push_set(&mut out, "species", &self.species);
        push_set(&mut out, "gender", &self.gender);
        out
    }
}

impl QueryFilter for EpisodeFilter {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        push_set(&mut out, "name", &self.name);
        push_set(&mut out, "episode", &self.episode);
        out
    }
}

impl QueryFilter for LocationFilter {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        push_set(&mut out, "name", &self.name);
        push_set(&mut out, "type", &self.kind);
        push_set(&mut out, "dimension", &self.dimension);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_code_is_fixed_prefix() {
        assert_eq!(season_code("S01E07"), "S01");
        assert_eq!(season_code("S05E10"), "S05");
        assert_eq!(season_code("S1"), "S1");
        assert_eq!(season_code(""), "");
    }

    #[test]
    fn blank_filters_are_omitted() {
        let f = CharacterFilter {
            name: Some("rick".into()),
            status: Some("  ".into()),
            species: None,
            gender: Some("male".into()),
        };
        assert_eq!(
            f.pairs(),
            vec![("name", "rick".to_string()), ("gender", "male".to_string())]
        );
        assert!(CharacterFilter::default().pairs().is_empty());
    }

    #[test]
    fn location_kind_is_sent_as_type() {
        let f = LocationFilter {
            kind: Some("Planet".into()),
            ..Default::default()
        };
        assert_eq!(f.pairs(), vec![("type", "Planet".to_string())]);
    }

    #[test]
    fn one_or_many_normalizes() {
        let one: OneOrMany<Location> = serde_json::from_str(
            r#"{"id":1,"name":"Earth (C-137)","type":"Planet","dimension":"Dimension C-137","residents":[]}"#,
        )
        .unwrap();
        assert_eq!(Vec::from(one).len(), 1);

        let many: OneOrMany<Location> = serde_json::from_str(
            r#"[{"id":1,"name":"Earth"},{"id":2,"name":"Abadango"}]"#,
        )
        .unwrap();
        assert_eq!(Vec::from(many).len(), 2);
    }
}
