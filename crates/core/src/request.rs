//! Read projection of a municipal service request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A closed service request, projected down to the fields the scoring model
/// consumes. Owned by the request source; the pipeline only holds a page of
/// these while it is being scored and persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    /// Stable identifier of the request lineage.
    pub root_id: String,
    /// When the request was closed. Requests without a closure date never
    /// reach the pipeline.
    pub closure_date: DateTime<Utc>,
    pub date_of_creation: DateTime<Utc>,
    /// Closure time of the previous request at the same address/defect, if
    /// any. The model uses the gap between closures as a repeat signal.
    pub date_of_previous_request_close: Option<DateTime<Utc>>,
    pub deffect_category_id: Option<i32>,
    pub deffect_category_name: Option<String>,
    pub work_type_done: Option<String>,
    pub urgency_category: Option<String>,
    pub owner_company: Option<String>,
    pub serving_company: Option<String>,
    pub performing_company: Option<String>,
    pub efficiency: Option<String>,
    pub times_returned: Option<i32>,
    pub grade_for_service: Option<String>,
    pub hood: Option<String>,
}
