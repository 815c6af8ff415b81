use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::repo_types::Student;

/// Full representation: every exposed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentDetail {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub controlnum: String,
    pub year: i32,
}

/// Lightweight representation for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentSummary {
    pub id: i64,
    pub name: String,
}

impl From<Student> for StudentDetail {
    fn from(s: Student) -> Self {
        Self {
            id: s.id,
            name: s.name,
            email: s.email,
            controlnum: s.controlnum,
            year: s.year,
        }
    }
}

impl From<Student> for StudentSummary {
    fn from(s: Student) -> Self {
        Self {
            id: s.id,
            name: s.name,
        }
    }
}

/// Operations on `/estudiantes/` that respond with a body. Delete answers 204.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
}

/// Named field subsets a student can be rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Full,
    Summary,
}

impl Profile {
    /// Profile for an action; `list` is what listings use.
    pub fn for_action(action: Action, list: Profile) -> Profile {
        match action {
            Action::List => list,
            Action::Retrieve | Action::Create | Action::Update => Profile::Full,
        }
    }

    pub fn render(self, student: Student) -> StudentRepr {
        match self {
            Profile::Full => StudentRepr::Full(student.into()),
            Profile::Summary => StudentRepr::Summary(student.into()),
        }
    }
}

impl FromStr for Profile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Profile::Full),
            "summary" => Ok(Profile::Summary),
            other => anyhow::bail!("unknown schema profile {:?}, expected full or summary", other),
        }
    }
}

/// A student rendered through a [`Profile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StudentRepr {
    Full(StudentDetail),
    Summary(StudentSummary),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> Student {
        Student {
            id: 7,
            name: "Ana".into(),
            email: "a@x.com".into(),
            controlnum: "C100".into(),
            year: 2021,
        }
    }

    #[test]
    fn full_profile_exposes_every_field() {
        let json = serde_json::to_value(Profile::Full.render(ana())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "name": "Ana",
                "email": "a@x.com",
                "controlnum": "C100",
                "year": 2021
            })
        );
    }

    #[test]
    fn summary_profile_exposes_id_and_name_only() {
        let json = serde_json::to_value(Profile::Summary.render(ana())).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 7, "name": "Ana" }));
    }

    #[test]
    fn only_list_follows_the_configured_profile() {
        assert_eq!(Profile::for_action(Action::List, Profile::Summary), Profile::Summary);
        assert_eq!(Profile::for_action(Action::List, Profile::Full), Profile::Full);
        for action in [Action::Retrieve, Action::Create, Action::Update] {
            assert_eq!(Profile::for_action(action, Profile::Summary), Profile::Full);
        }
    }

    #[test]
    fn parses_profile_names() {
        assert_eq!("Summary".parse::<Profile>().unwrap(), Profile::Summary);
        assert_eq!(" full ".parse::<Profile>().unwrap(), Profile::Full);
        assert!("compact".parse::<Profile>().is_err());
    }
}
