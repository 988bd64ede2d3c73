use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CostPoint {
    pub date: NaiveDate,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DateSuccessRate {
    pub date: NaiveDate,
    pub total: u32,
    pub successful: u32,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ScriptSuccessRate {
    pub script: String,
    pub total: u32,
    pub successful: u32,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DashboardMetrics {
    pub total_calls: u32,
    pub total_duration: f64,
    pub total_cost: f64,
    pub successful_calls: u32,
    pub appointments_taken: u32,
    pub average_cost_per_call: f64,
    pub average_cost_per_minute: f64,
    pub average_duration_per_call: f64,
    pub cost_per_appointment: f64,
    pub success_rate: f64,
    pub cost_by_date: Vec<CostPoint>,
    pub success_rate_by_date: Vec<DateSuccessRate>,
    pub success_rate_by_script: Vec<ScriptSuccessRate>,
}
