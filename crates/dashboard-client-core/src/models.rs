//! Wire shapes for the dashboard backend endpoints the client calls directly.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::token::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub department: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReview {
    pub id: i64,
    pub employee_id: i64,
    pub manager_id: i64,
    pub rating: f64,
    #[serde(default)]
    pub comments: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub total_employees: u64,
    pub average_performance: f64,
    pub feedback_count: u64,
    #[serde(default)]
    pub latest_rating: Option<f64>,
    pub kpi_achievement_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerDashboard {
    pub team_size: u64,
    pub average_performance: f64,
    pub feedback_count: u64,
    #[serde(default)]
    pub latest_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDashboard {
    pub average_performance: f64,
    pub feedback_count: u64,
    #[serde(default)]
    pub latest_rating: Option<f64>,
    #[serde(default)]
    pub reviews: Vec<PerformanceReview>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum DashboardSummary {
    Admin(AdminDashboard),
    Manager(ManagerDashboard),
    Employee(EmployeeDashboard),
}

impl DashboardSummary {
    pub fn role(&self) -> Role {
        match self {
            Self::Admin(_) => Role::Admin,
            Self::Manager(_) => Role::Manager,
            Self::Employee(_) => Role::Employee,
        }
    }

    pub fn average_performance(&self) -> f64 {
        match self {
            Self::Admin(summary) => summary.average_performance,
            Self::Manager(summary) => summary.average_performance,
            Self::Employee(summary) => summary.average_performance,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn employee_dashboard_decodes_backend_payload() {
        let payload = json!({
            "average_performance": 4.2,
            "feedback_count": 3,
            "latest_rating": null,
            "reviews": [{
                "id": 9,
                "employee_id": 12,
                "manager_id": 4,
                "rating": 4.5,
                "comments": "Solid performer with strong potential.",
                "created_at": "2024-03-01T09:15:00.123456"
            }]
        });
        let summary: EmployeeDashboard = serde_json::from_value(payload).expect("decodes");
        assert_eq!(summary.latest_rating, None);
        assert_eq!(summary.reviews.len(), 1);
        assert_eq!(summary.reviews[0].manager_id, 4);
    }

    #[test]
    fn new_user_omits_unset_optional_fields() {
        let user = NewUser {
            name: "Sam Lee".to_string(),
            email: "sam@example.com".to_string(),
            password: "hunter22".to_string(),
            department: None,
            role: Some(Role::Employee),
            manager_id: None,
        };
        assert_eq!(
            serde_json::to_value(&user).expect("serializes"),
            json!({
                "name": "Sam Lee",
                "email": "sam@example.com",
                "password": "hunter22",
                "role": "Employee"
            })
        );
    }

    #[test]
    fn summary_serializes_with_role_tag() {
        let summary = DashboardSummary::Manager(ManagerDashboard {
            team_size: 5,
            average_performance: 3.8,
            feedback_count: 2,
            latest_rating: Some(4.0),
        });
        let value = serde_json::to_value(&summary).expect("serializes");
        assert_eq!(value["role"], "manager");
        assert_eq!(value["team_size"], 5);
        assert_eq!(summary.role(), Role::Manager);
    }
}
