use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": "6650f1c2a1b2c3d4e5f60718",
        "first_name": "John",
        "last_name": "Doe",
        "tax_id": "245871236",
        "department": "Operations",
        "team_lead": "Ernesto",
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = "6650f1c2a1b2c3d4e5f60718")]
    pub id: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    /// Tax / registration number.
    #[schema(example = "245871236")]
    pub tax_id: String,

    #[schema(example = "Operations", nullable = true)]
    pub department: Option<String>,

    #[schema(example = "Ernesto", nullable = true)]
    pub team_lead: Option<String>,

    pub status: EmployeeStatus,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct NewEmployee {
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "245871236")]
    pub tax_id: String,
    #[schema(example = "Operations")]
    pub department: Option<String>,
    #[schema(example = "Ernesto")]
    pub team_lead: Option<String>,
    #[serde(default)]
    pub status: EmployeeStatus,
}

impl NewEmployee {
    pub fn into_employee(self, id: String) -> Employee {
        Employee {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            tax_id: self.tax_id,
            department: self.department,
            team_lead: self.team_lead,
            status: self.status,
        }
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct EmployeeUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub tax_id: Option<String>,
    pub department: Option<String>,
    pub team_lead: Option<String>,
    pub status: Option<EmployeeStatus>,
}

impl EmployeeUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.tax_id.is_none()
            && self.department.is_none()
            && self.team_lead.is_none()
            && self.status.is_none()
    }

    pub fn apply(&self, employee: &mut Employee) {
        if let Some(v) = &self.first_name {
            employee.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            employee.last_name = v.clone();
        }
        if let Some(v) = &self.tax_id {
            employee.tax_id = v.clone();
        }
        if let Some(v) = &self.department {
            employee.department = Some(v.clone());
        }
        if let Some(v) = &self.team_lead {
            employee.team_lead = Some(v.clone());
        }
        if let Some(v) = self.status {
            employee.status = v;
        }
    }
}
