//! Static site content: the records the showcase sections render.
//!
//! The content is an embedded JSON document. The animation core only ever
//! reads the number and order of records; it never mutates them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

const EMBEDDED: &str = include_str!("../data/content.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
    pub role: String,
    pub tagline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavItem {
    pub name: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub image: String,
    pub tags: Vec<String>,
    pub github: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteContent {
    pub owner: Owner,
    pub navigation: Vec<NavItem>,
    pub projects: Vec<Project>,
    pub skills: Vec<Skill>,
    pub technologies: Vec<Technology>,
}

impl SiteContent {
    /// The content shipped with the crate.
    pub fn embedded() -> Result<Self, ContentError> {
        Self::from_json(EMBEDDED)
    }

    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let content: SiteContent = serde_json::from_str(json)?;
        content.check_ids()?;
        Ok(content)
    }

    fn check_ids(&self) -> Result<(), ContentError> {
        let mut seen = HashSet::new();
        for project in &self.projects {
            if !seen.insert(project.id) {
                return Err(ContentError::DuplicateId {
                    kind: "project",
                    id: project.id,
                });
            }
        }
        seen.clear();
        for skill in &self.skills {
            if !seen.insert(skill.id) {
                return Err(ContentError::DuplicateId {
                    kind: "skill",
                    id: skill.id,
                });
            }
        }
        Ok(())
    }
}
