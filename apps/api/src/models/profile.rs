use serde::{Deserialize, Serialize};

/// A skill as supplied by the profile store: either a bare name or a
/// structured record. Only the name takes part in matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillInput {
    Name(String),
    Record {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level: Option<String>,
        #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
    },
}

impl SkillInput {
    pub fn name(&self) -> &str {
        match self {
            SkillInput::Name(name) => name,
            SkillInput::Record { name, .. } => name,
        }
    }
}

impl From<&str> for SkillInput {
    fn from(name: &str) -> Self {
        SkillInput::Name(name.to_string())
    }
}

/// Student profile consumed by a single ranking call.
///
/// Every list and narrative field defaults to empty: a missing field weakens
/// the matching sub-signal rather than failing the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    #[serde(alias = "id")]
    pub student_id: String,
    #[serde(default)]
    pub skills: Vec<SkillInput>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default, alias = "experienceText")]
    pub past_experiences: String,
    #[serde(default, alias = "academicText")]
    pub academic_achievements: String,
}

impl StudentProfile {
    pub fn skill_names(&self) -> impl Iterator<Item = &str> {
        self.skills.iter().map(SkillInput::name)
    }
}
