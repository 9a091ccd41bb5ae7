//! Feature endpoints of the HR API.
//!
//! The console treats these as opaque: it sends the bearer token and hands
//! the JSON it gets back to the caller for rendering.

use crate::error::ApiError;
use crate::services::api_client::{ApiClient, ApiRequest};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Employees,
    Departments,
    AttendanceRecords,
    AttendanceStatistics,
    AnnualLeaveBalance,
    AnnualLeaveGrants,
    AnnualLeaveUsages,
    AnnualLeaveRequests,
    Payrolls,
    PayrollSummary,
    BonusPolicies,
    BonusBudgets,
    BonusCalculations,
    CompanyTargets,
    DepartmentTargets,
    EmployeeTargets,
    TargetCategories,
    MonthlyEvaluations,
    WorkSchedules,
    WorkScheduleTemplates,
    DashboardOverview,
    MyAttendance,
    MyAnnualLeave,
    MyPayroll,
    MyStatistics,
    MyWorkSchedule,
}

impl Resource {
    pub const ALL: [Resource; 26] = [
        Resource::Employees,
        Resource::Departments,
        Resource::AttendanceRecords,
        Resource::AttendanceStatistics,
        Resource::AnnualLeaveBalance,
        Resource::AnnualLeaveGrants,
        Resource::AnnualLeaveUsages,
        Resource::AnnualLeaveRequests,
        Resource::Payrolls,
        Resource::PayrollSummary,
        Resource::BonusPolicies,
        Resource::BonusBudgets,
        Resource::BonusCalculations,
        Resource::CompanyTargets,
        Resource::DepartmentTargets,
        Resource::EmployeeTargets,
        Resource::TargetCategories,
        Resource::MonthlyEvaluations,
        Resource::WorkSchedules,
        Resource::WorkScheduleTemplates,
        Resource::DashboardOverview,
        Resource::MyAttendance,
        Resource::MyAnnualLeave,
        Resource::MyPayroll,
        Resource::MyStatistics,
        Resource::MyWorkSchedule,
    ];

    /// Path relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Employees => "/employees",
            Resource::Departments => "/departments",
            Resource::AttendanceRecords => "/attendance/records",
            Resource::AttendanceStatistics => "/attendance/statistics",
            Resource::AnnualLeaveBalance => "/annual-leave/balance",
            Resource::AnnualLeaveGrants => "/annual-leave/grants",
            Resource::AnnualLeaveUsages => "/annual-leave/usages",
            Resource::AnnualLeaveRequests => "/annual-leave/requests",
            Resource::Payrolls => "/payrolls",
            Resource::PayrollSummary => "/payrolls/summary",
            Resource::BonusPolicies => "/bonus-policies",
            Resource::BonusBudgets => "/bonus-budgets",
            Resource::BonusCalculations => "/bonus-calculations",
            Resource::CompanyTargets => "/company-targets",
            Resource::DepartmentTargets => "/department-targets",
            Resource::EmployeeTargets => "/employee-targets",
            Resource::TargetCategories => "/target-categories",
            Resource::MonthlyEvaluations => "/monthly-evaluations",
            Resource::WorkSchedules => "/work-schedules",
            Resource::WorkScheduleTemplates => "/work-schedules/templates",
            Resource::DashboardOverview => "/dashboard/overview",
            Resource::MyAttendance => "/my-attendance",
            Resource::MyAnnualLeave => "/my-annual-leave",
            Resource::MyPayroll => "/my-payroll",
            Resource::MyStatistics => "/my-statistics",
            Resource::MyWorkSchedule => "/my-work-schedule",
        }
    }

    /// Command-line name, e.g. `attendance-records`.
    pub fn name(&self) -> String {
        self.path().trim_start_matches('/').replace('/', "-")
    }

    /// Resources backing the admin dashboard only.
    pub fn admin_only(&self) -> bool {
        !matches!(
            self,
            Resource::MyAttendance
                | Resource::MyAnnualLeave
                | Resource::MyPayroll
                | Resource::MyStatistics
                | Resource::MyWorkSchedule
                | Resource::AnnualLeaveBalance
                | Resource::AnnualLeaveRequests
                | Resource::TargetCategories
        )
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('/').replace('/', "-");
        Resource::ALL
            .iter()
            .copied()
            .find(|r| r.name() == wanted)
            .ok_or_else(|| format!("Unknown resource '{}'", s))
    }
}

/// Thin CRUD facade over [`ApiClient`] for the feature endpoints.
#[derive(Clone)]
pub struct HrApi {
    api: Arc<ApiClient>,
}

impl HrApi {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self, resource: Resource, query: &[(String, String)]) -> Result<Value, ApiError> {
        let mut request = ApiRequest::get(resource.path());
        request.query.extend_from_slice(query);
        self.api.request_json(request).await
    }

    pub async fn get(&self, resource: Resource, id: i64) -> Result<Value, ApiError> {
        self.api
            .get_json(&format!("{}/{}", resource.path(), id))
            .await
    }

    pub async fn create(&self, resource: Resource, body: &Value) -> Result<Value, ApiError> {
        self.api.post_json(resource.path(), body).await
    }

    pub async fn update(&self, resource: Resource, id: i64, body: &Value) -> Result<Value, ApiError> {
        self.api
            .put_json(&format!("{}/{}", resource.path(), id), body)
            .await
    }

    pub async fn delete(&self, resource: Resource, id: i64) -> Result<Value, ApiError> {
        self.api
            .request_json(ApiRequest::delete(format!("{}/{}", resource.path(), id)))
            .await
    }

    /// POST to a sub-action, e.g. `annual-leave/requests/12/approve`.
    pub async fn action(
        &self,
        resource: Resource,
        id: Option<i64>,
        action: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let path = match id {
            Some(id) => format!("{}/{}/{}", resource.path(), id, action),
            None => format!("{}/{}", resource.path(), action),
        };

        let mut request = ApiRequest::post(path);
        request.body = body.cloned();
        self.api.request_json(request).await
    }
}
