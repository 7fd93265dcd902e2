use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A movie as returned by the catalog. Only `id`, `title` and `poster_path`
/// are interpreted; everything else is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Movie {
    pub fn vote_average(&self) -> Option<f64> {
        self.extra.get("vote_average").and_then(Value::as_f64)
    }

    pub fn original_language(&self) -> Option<&str> {
        self.extra
            .get("original_language")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn release_year(&self) -> Option<&str> {
        self.extra
            .get("release_date")
            .and_then(Value::as_str)
            .and_then(|d| d.split('-').next())
            .filter(|y| y.len() == 4)
    }

    pub fn poster_url(&self, image_base: &str) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", image_base, p))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogResponse {
    #[serde(default, alias = "Response")]
    pub response: Option<Value>,
    #[serde(default, alias = "Error")]
    pub error: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<Movie>>,
}

impl CatalogResponse {
    /// The catalog flags its own failures with `"response": "False"`.
    pub fn is_failure(&self) -> bool {
        match &self.response {
            Some(Value::String(s)) => s.eq_ignore_ascii_case("false"),
            Some(Value::Bool(b)) => !b,
            _ => false,
        }
    }
}
