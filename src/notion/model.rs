//! Wire types for the Notion API: pages with their tagged property values,
//! query results, and database schema introspection.
//!
//! Property values are an internally tagged union. Decoding is exhaustive;
//! any tag this crate does not use lands in [`PropertyValue::Unknown`] and
//! the extractors treat it as absent.
use serde::Deserialize;
use std::collections::HashMap;

pub type PropertyMap = HashMap<String, PropertyValue>;

#[derive(Deserialize, Debug, Clone)]
pub struct QueryDatabaseResp {
    #[serde(default)]
    pub results: Vec<Page>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub cover: Option<FileRef>,
    #[serde(default)]
    pub properties: PropertyMap,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichText>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichText>,
    },
    Url {
        #[serde(default)]
        url: Option<String>,
    },
    Number {
        #[serde(default)]
        number: Option<f64>,
    },
    Checkbox {
        #[serde(default)]
        checkbox: bool,
    },
    Select {
        #[serde(default)]
        select: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Date {
        #[serde(default)]
        date: Option<DateValue>,
    },
    Files {
        #[serde(default)]
        files: Vec<FileRef>,
    },
    Relation {
        #[serde(default)]
        relation: Vec<PageRef>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DateValue {
    #[serde(default)]
    pub start: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PageRef {
    pub id: String,
}

/// A page cover or one entry of a `files` property. Hosted uploads and
/// external links carry their URL under different keys.
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileRef {
    External { external: FileUrl },
    File { file: FileUrl },
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FileUrl {
    pub url: String,
}

impl FileRef {
    pub fn url(&self) -> Option<&str> {
        match self {
            FileRef::External { external } => Some(&external.url),
            FileRef::File { file } => Some(&file.url),
            FileRef::Unknown => None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct RetrieveDatabaseResp {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, DatabaseProperty>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseProperty {
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(default)]
    pub select: Option<OptionList>,
    #[serde(default)]
    pub multi_select: Option<OptionList>,
    #[serde(default)]
    pub status: Option<OptionList>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct OptionList {
    #[serde(default)]
    pub options: Vec<SelectOption>,
}
