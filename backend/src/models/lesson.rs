use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type LessonId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Lesson {
    pub id: LessonId,
    pub module_id: i64,
    pub parent_id: Option<LessonId>,
    pub title: String,
    pub content: String,
    pub order_index: i64,
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Lesson {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLessonRequest {
    pub parent_id: Option<LessonId>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub order_index: i64,
    #[serde(default)]
    pub is_published: bool,
}

/// `parent_id` uses a double option so a client can detach a child
/// (`"parent_id": null`) as opposed to leaving it untouched (field absent).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLessonRequest {
    #[serde(default, with = "double_option")]
    pub parent_id: Option<Option<LessonId>>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub order_index: Option<i64>,
    pub is_published: Option<bool>,
}

mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
