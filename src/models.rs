//! Domain types for flooring projects and their nested records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Owned;

/// Project classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Residential,
    Commercial,
    Industrial,
    Other,
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectType::Residential => write!(f, "residential"),
            ProjectType::Commercial => write!(f, "commercial"),
            ProjectType::Industrial => write!(f, "industrial"),
            ProjectType::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for ProjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "residential" => Ok(ProjectType::Residential),
            "commercial" => Ok(ProjectType::Commercial),
            "industrial" => Ok(ProjectType::Industrial),
            "other" => Ok(ProjectType::Other),
            _ => Err(format!("Unknown project type: {}", s)),
        }
    }
}

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    InProgress,
    Completed,
    Cancelled,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::InProgress => write!(f, "in_progress"),
            ProjectStatus::Completed => write!(f, "completed"),
            ProjectStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_progress" => Ok(ProjectStatus::InProgress),
            "completed" => Ok(ProjectStatus::Completed),
            "cancelled" => Ok(ProjectStatus::Cancelled),
            _ => Err(format!("Unknown project status: {}", s)),
        }
    }
}

/// Installation complexity of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Default for Complexity {
    fn default() -> Self {
        Complexity::Medium
    }
}

/// Measurement unit for materials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialUnit {
    SquareMeter,
    Meter,
    Piece,
    Package,
    Kilogram,
    Liter,
}

/// Room dimensions in meters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub length: f64,
}

/// A room within a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    pub area: f64,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
}

/// A material line item within a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub quantity: f64,
    pub unit: MaterialUnit,
    pub unit_price: f64,
}

/// A file attached to a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFile {
    pub id: String,
    pub filename: String,
    pub original_name: String,
    pub path: String,
    pub size: u64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A free-form note attached to a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    pub date: DateTime<Utc>,
}

/// A flooring/renovation project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    /// Identity that owns this project
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub total_area: f64,
    pub project_type: ProjectType,
    pub main_material: String,
    pub status: ProjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub files: Vec<ProjectFile>,
    #[serde(default)]
    pub notes: Vec<Note>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Total material cost across all line items
    pub fn total_cost(&self) -> f64 {
        self.materials
            .iter()
            .map(|m| m.quantity * m.unit_price)
            .sum()
    }
}

impl Owned for Project {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(quantity: f64, unit_price: f64) -> Material {
        Material {
            name: "Laminate flooring".to_string(),
            quantity,
            unit: MaterialUnit::SquareMeter,
            unit_price,
        }
    }

    #[test]
    fn test_total_cost_sums_line_items() {
        let project = Project {
            id: "p1".to_string(),
            user_id: "u1".to_string(),
            name: "Apartment".to_string(),
            description: String::new(),
            total_area: 120.0,
            project_type: ProjectType::Residential,
            main_material: "Laminate".to_string(),
            status: ProjectStatus::InProgress,
            budget: None,
            deadline: None,
            rooms: vec![],
            materials: vec![material(100.0, 45.9), material(10.0, 5.5)],
            files: vec![],
            notes: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!((project.total_cost() - 4645.0).abs() < 1e-9);
    }

    #[test]
    fn test_project_type_round_trip() {
        for t in [
            ProjectType::Residential,
            ProjectType::Commercial,
            ProjectType::Industrial,
            ProjectType::Other,
        ] {
            assert_eq!(t.to_string().parse::<ProjectType>().unwrap(), t);
        }
    }

    #[test]
    fn test_status_rejects_unknown() {
        assert!("archived".parse::<ProjectStatus>().is_err());
    }
}
