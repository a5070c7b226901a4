// src/domain/school.rs

/// A nearby school as bundled with a listing search response.
#[derive(Debug, Clone, PartialEq)]
pub struct SchoolRecord {
    pub name: String,
    /// GreatSchools rating; missing or "NR" ratings stay `None`.
    pub rating: Option<f64>,
    pub is_elementary: bool,
    pub is_middle: bool,
    pub is_high: bool,
    pub is_public: bool,
    pub is_private: bool,
    pub website: Option<String>,
}
