//! # Regulatory Compliance Reporting
//!
//! Automated generation of regulatory reports for various jurisdictions
//! and compliance authorities.

use crate::{Error, Result, PeerId};
use crate::compliance::{ComplianceStatus, RiskScore};
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Types of regulatory reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportType {
    /// Suspicious Activity Report
    SAR,
    /// Currency Transaction Report
    CTR,
    /// Large Cash Transaction Report
    LCTR,
    /// Anti-Money Laundering compliance report
    AMLCompliance,
    /// Know Your Customer compliance report
    KYCCompliance,
    /// Transaction monitoring summary
    TransactionMonitoring,
    /// Sanctions screening report
    SanctionsScreening,
}

/// Generated regulatory report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulatoryReport {
    /// Report ID
    pub report_id: String,
    /// Report type
    pub report_type: ReportType,
    /// Report title
    pub title: String,
    /// Report data
    pub data: ReportData,
    /// Generated timestamp
    pub generated_at: DateTime<Utc>,
    /// Report period
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    /// Reporting entity
    pub reporting_entity: String,
}

/// Report data content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportData {
    /// SAR report data
    SAR {
        subject_id: PeerId,
        suspicious_activities: Vec<SuspiciousActivity>,
        narrative: String,
        total_amount: u64,
    },
    /// CTR report data
    CTR {
        transactions: Vec<LargeTransaction>,
        total_amount: u64,
        unique_customers: u32,
    },
    /// Compliance summary data
    ComplianceSummary {
        total_users: u32,
        verified_users: u32,
        high_risk_users: u32,
        violations: Vec<ComplianceViolation>,
    },
}

/// Suspicious activity for SAR reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousActivity {
    /// Activity type
    pub activity_type: String,
    /// Activity description
    pub description: String,
    /// Amount involved
    pub amount: u64,
    /// When detected
    pub detected_at: DateTime<Utc>,
    /// Risk score
    pub risk_score: RiskScore,
}

/// Large transaction for CTR reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LargeTransaction {
    /// Transaction ID
    pub transaction_id: String,
    /// Customer ID
    pub customer_id: PeerId,
    /// Transaction amount
    pub amount: u64,
    /// Transaction date
    pub date: DateTime<Utc>,
    /// Transaction type
    pub transaction_type: String,
}

/// Compliance violation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceViolation {
    /// Violation type
    pub violation_type: String,
    /// Description
    pub description: String,
    /// Severity
    pub severity: String,
    /// When detected
    pub detected_at: DateTime<Utc>,
    /// Resolution status
    pub resolved: bool,
}

/// Compliance reporter
pub struct ComplianceReporter {
    /// Report templates
    templates: HashMap<ReportType, ReportTemplate>,
}

/// Report generation template
#[derive(Debug, Clone)]
pub struct ReportTemplate {
    /// Template name
    pub name: String,
    /// Required fields
    pub required_fields: Vec<String>,
    /// Output format
    pub format: ReportFormat,
}

/// Report output format
#[derive(Debug, Clone, Copy)]
pub enum ReportFormat {
    /// JSON format
    Json,
    /// XML format (common for regulatory reports)
    Xml,
    /// CSV format
    Csv,
    /// PDF format
    Pdf,
}

impl ComplianceReporter {
    /// Create new compliance reporter
    pub async fn new() -> Result<Self> {
        let mut templates = HashMap::new();
        
        // SAR template
        templates.insert(ReportType::SAR, ReportTemplate {
            name: "Suspicious Activity Report".to_string(),
            required_fields: vec![
                "subject_id".to_string(),
                "activities".to_string(),
                "narrative".to_string(),
            ],
            format: ReportFormat::Xml,
        });

        // CTR template
        templates.insert(ReportType::CTR, ReportTemplate {
            name: "Currency Transaction Report".to_string(),
            required_fields: vec![
                "transactions".to_string(),
                "total_amount".to_string(),
            ],
            format: ReportFormat::Xml,
        });

        Ok(Self { templates })
    }

    /// Generate regulatory report
    pub async fn generate_report(
        &self,
        report_type: ReportType,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<RegulatoryReport> {
        let report_id = uuid::Uuid::new_v4().to_string();
        
        let data = match report_type {
            ReportType::SAR => self.generate_sar_data(start_date, end_date).await?,
            ReportType::CTR => self.generate_ctr_data(start_date, end_date).await?,
            ReportType::AMLCompliance => self.generate_aml_compliance_data(start_date, end_date).await?,
            _ => return Err(Error::ValidationError("Report type not implemented".to_string())),
        };

        Ok(RegulatoryReport {
            report_id,
            report_type,
            title: format!("{:?} Report", report_type),
            data,
            generated_at: Utc::now(),
            period_start: start_date,
            period_end: end_date,
            reporting_entity: "BitCraps Casino".to_string(),
        })
    }

    /// Generate SAR report data
    async fn generate_sar_data(
        &self,
        _start_date: DateTime<Utc>,
        _end_date: DateTime<Utc>,
    ) -> Result<ReportData> {
        // Mock implementation
        Ok(ReportData::SAR {
            subject_id: [1u8; 32],
            suspicious_activities: vec![
                SuspiciousActivity {
                    activity_type: "Structuring".to_string(),
                    description: "Multiple transactions just below reporting threshold".to_string(),
                    amount: 9900,
                    detected_at: Utc::now(),
                    risk_score: RiskScore::High,
                }
            ],
            narrative: "Subject engaged in structuring behavior over reporting period".to_string(),
            total_amount: 29700,
        })
    }

    /// Generate CTR report data
    async fn generate_ctr_data(
        &self,
        _start_date: DateTime<Utc>,
        _end_date: DateTime<Utc>,
    ) -> Result<ReportData> {
        // Mock implementation
        Ok(ReportData::CTR {
            transactions: vec![
                LargeTransaction {
                    transaction_id: "TX-001".to_string(),
                    customer_id: [1u8; 32],
                    amount: 15000,
                    date: Utc::now(),
                    transaction_type: "Gaming".to_string(),
                }
            ],
            total_amount: 15000,
            unique_customers: 1,
        })
    }

    /// Generate AML compliance summary
    async fn generate_aml_compliance_data(
        &self,
        _start_date: DateTime<Utc>,
        _end_date: DateTime<Utc>,
    ) -> Result<ReportData> {
        Ok(ReportData::ComplianceSummary {
            total_users: 1000,
            verified_users: 850,
            high_risk_users: 15,
            violations: vec![
                ComplianceViolation {
                    violation_type: "Insufficient KYC".to_string(),
                    description: "User attempted large transaction without proper verification".to_string(),
                    severity: "Medium".to_string(),
                    detected_at: Utc::now(),
                    resolved: false,
                }
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_compliance_reporter_creation() {
        let reporter = ComplianceReporter::new().await.unwrap();
        assert!(reporter.templates.contains_key(&ReportType::SAR));
        assert!(reporter.templates.contains_key(&ReportType::CTR));
    }

    #[tokio::test]
    async fn test_sar_report_generation() {
        let reporter = ComplianceReporter::new().await.unwrap();
        let start = Utc::now() - chrono::Duration::days(30);
        let end = Utc::now();
        
        let report = reporter.generate_report(ReportType::SAR, start, end).await.unwrap();
        assert_eq!(report.report_type, ReportType::SAR);
        assert!(matches!(report.data, ReportData::SAR { .. }));
    }

    #[tokio::test]
    async fn test_ctr_report_generation() {
        let reporter = ComplianceReporter::new().await.unwrap();
        let start = Utc::now() - chrono::Duration::days(7);
        let end = Utc::now();
        
        let report = reporter.generate_report(ReportType::CTR, start, end).await.unwrap();
        assert_eq!(report.report_type, ReportType::CTR);
        assert!(matches!(report.data, ReportData::CTR { .. }));
    }
}