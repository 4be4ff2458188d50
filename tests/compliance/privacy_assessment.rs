//! Privacy Assessment Module
//! 
//! Implements comprehensive privacy impact assessment and
//! privacy-by-design validation for the BitCraps platform.

use std::collections::HashMap;
use std::time::SystemTime;
use serde::{Serialize, Deserialize};

#[derive(Debug, Clone)]
pub struct PrivacyAssessmentFramework {
    data_flows: Vec<DataFlow>,
    privacy_controls: HashMap<String, PrivacyControl>,
    risk_assessments: Vec<PrivacyRisk>,
    legal_bases: HashMap<String, LegalBasis>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivacyAssessmentResult {
    pub overall_privacy_score: f64,
    pub data_minimization_score: f64,
    pub purpose_limitation_score: f64,
    pub transparency_score: f64,
    pub security_score: f64,
    pub user_control_score: f64,
    pub privacy_risks: Vec<PrivacyRiskAssessment>,
    pub recommendations: Vec<PrivacyRecommendation>,
    pub compliance_gaps: Vec<PrivacyGap>,
}

#[derive(Debug, Clone)]
struct DataFlow {
    id: String,
    source: DataSource,
    destination: DataDestination,
    data_types: Vec<DataType>,
    processing_purpose: String,
    legal_basis: String,
    security_measures: Vec<String>,
    retention_period: Option<std::time::Duration>,
    cross_border: bool,
}

#[derive(Debug, Clone)]
enum DataSource {
    User,
    Device,
    Network,
    System,
    ThirdParty,
}

#[derive(Debug, Clone)]
enum DataDestination {
    LocalStorage,
    PeerDevice,
    NetworkBroadcast,
    Analytics,
    Backup,
    Deletion,
}

#[derive(Debug, Clone)]
enum DataType {
    DeviceIdentifiers,
    CryptographicKeys,
    GameTransactions,
    NetworkTopology,
    UsagePatterns,
    BiometricData,
    LocationData,
    CommunicationMetadata,
}

#[derive(Debug, Clone)]
struct PrivacyControl {
    name: String,
    description: String,
    implemented: bool,
    effectiveness: f64,
    scope: ControlScope,
    testing_frequency: String,
}

#[derive(Debug, Clone)]
enum ControlScope {
    DataCollection,
    DataProcessing,
    DataStorage,
    DataSharing,
    DataDeletion,
    UserRights,
    Transparency,
}

#[derive(Debug, Clone)]
struct PrivacyRisk {
    id: String,
    description: String,
    likelihood: RiskLikelihood,
    impact: RiskImpact,
    affected_data_types: Vec<DataType>,
    mitigation_measures: Vec<String>,
}

#[derive(Debug, Clone)]
enum RiskLikelihood {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

#[derive(Debug, Clone)]
enum RiskImpact {
    Minimal,
    Minor,
    Moderate,
    Major,
    Severe,
}

#[derive(Debug, Clone)]
struct LegalBasis {
    regulation: String,
    basis_type: String,
    description: String,
    conditions: Vec<String>,
    documentation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivacyRiskAssessment {
    pub risk_id: String,
    pub description: String,
    pub likelihood: String,
    pub impact: String,
    pub risk_level: String,
    pub mitigation_status: String,
    pub residual_risk: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivacyRecommendation {
    pub priority: String,
    pub recommendation: String,
    pub rationale: String,
    pub implementation_effort: String,
    pub compliance_benefit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivacyGap {
    pub requirement: String,
    pub current_status: String,
    pub gap_description: String,
    pub remediation_plan: String,
    pub timeline: String,
}

impl PrivacyAssessmentFramework {
    pub fn new() -> Self {
        let mut framework = Self {
            data_flows: Vec::new(),
            privacy_controls: HashMap::new(),
            risk_assessments: Vec::new(),
            legal_bases: HashMap::new(),
        };
        
        framework.initialize_bitcraps_data_flows();
        framework.initialize_privacy_controls();
        framework.initialize_privacy_risks();
        framework.initialize_legal_bases();
        
        framework
    }
    
    fn initialize_bitcraps_data_flows(&mut self) {
        // User to local storage - cryptographic keys
        self.data_flows.push(DataFlow {
            id: "DF001".to_string(),
            source: DataSource::User,
            destination: DataDestination::LocalStorage,
            data_types: vec![DataType::CryptographicKeys, DataType::DeviceIdentifiers],
            processing_purpose: "User identity and authentication".to_string(),
            legal_basis: "Contract performance".to_string(),
            security_measures: vec![
                "ChaCha20Poly1305 encryption".to_string(),
                "Hardware security module".to_string(),
                "Key derivation functions".to_string(),
            ],
            retention_period: None, // Until user deletion
            cross_border: false,
        });
        
        // Device to peer devices - game transactions
        self.data_flows.push(DataFlow {
            id: "DF002".to_string(),
            source: DataSource::User,
            destination: DataDestination::PeerDevice,
            data_types: vec![DataType::GameTransactions, DataType::DeviceIdentifiers],
            processing_purpose: "Game session consensus and state synchronization".to_string(),
            legal_basis: "Contract performance".to_string(),
            security_measures: vec![
                "End-to-end encryption".to_string(),
                "Digital signatures".to_string(),
                "Session-based keys".to_string(),
            ],
            retention_period: Some(std::time::Duration::from_secs(30 * 24 * 60 * 60)), // 30 days
            cross_border: true, // P2P network may cross borders
        });
        
        // Device to network - P2P discovery
        self.data_flows.push(DataFlow {
            id: "DF003".to_string(),
            source: DataSource::Device,
            destination: DataDestination::NetworkBroadcast,
            data_types: vec![DataType::DeviceIdentifiers, DataType::NetworkTopology],
            processing_purpose: "P2P device discovery and mesh networking".to_string(),
            legal_basis: "Legitimate interests".to_string(),
            security_measures: vec![
                "MAC address randomization".to_string(),
                "Rotating service UUIDs".to_string(),
                "Minimal advertisement data".to_string(),
            ],
            retention_period: Some(std::time::Duration::from_secs(24 * 60 * 60)), // 24 hours
            cross_border: true,
        });
        
        // System to analytics - usage patterns (optional)
        self.data_flows.push(DataFlow {
            id: "DF004".to_string(),
            source: DataSource::System,
            destination: DataDestination::Analytics,
            data_types: vec![DataType::UsagePatterns],
            processing_purpose: "Privacy-preserving analytics and system improvement".to_string(),
            legal_basis: "Consent".to_string(),
            security_measures: vec![
                "Differential privacy".to_string(),
                "Data aggregation".to_string(),
                "Pseudonymization".to_string(),
            ],
            retention_period: Some(std::time::Duration::from_secs(365 * 24 * 60 * 60)), // 1 year
            cross_border: false,
        });
        
        // User request to deletion - right to be forgotten
        self.data_flows.push(DataFlow {
            id: "DF005".to_string(),
            source: DataSource::User,
            destination: DataDestination::Deletion,
            data_types: vec![
                DataType::CryptographicKeys,
                DataType::GameTransactions,
                DataType::UsagePatterns,
                DataType::CommunicationMetadata,
            ],
            processing_purpose: "User-requested data deletion (right to be forgotten)".to_string(),
            legal_basis: "Legal obligation".to_string(),
            security_measures: vec![
                "Secure deletion".to_string(),
                "Cryptographic erasure".to_string(),
                "Verification of deletion".to_string(),
            ],
            retention_period: Some(std::time::Duration::from_secs(0)), // Immediate
            cross_border: false,
        });
    }
    
    fn initialize_privacy_controls(&mut self) {
        // Data minimization
        self.privacy_controls.insert("data_minimization".to_string(), PrivacyControl {
            name: "Data Minimization".to_string(),
            description: "Collect only data necessary for specific purposes".to_string(),
            implemented: true,
            effectiveness: 90.0,
            scope: ControlScope::DataCollection,
            testing_frequency: "Continuous".to_string(),
        });
        
        // Purpose limitation
        self.privacy_controls.insert("purpose_limitation".to_string(), PrivacyControl {
            name: "Purpose Limitation".to_string(),
            description: "Use data only for stated and compatible purposes".to_string(),
            implemented: true,
            effectiveness: 95.0,
            scope: ControlScope::DataProcessing,
            testing_frequency: "Weekly".to_string(),
        });
        
        // Storage limitation
        self.privacy_controls.insert("storage_limitation".to_string(), PrivacyControl {
            name: "Storage Limitation".to_string(),
            description: "Retain data only as long as necessary".to_string(),
            implemented: true,
            effectiveness: 85.0,
            scope: ControlScope::DataStorage,
            testing_frequency: "Daily".to_string(),
        });
        
        // Accuracy
        self.privacy_controls.insert("accuracy".to_string(), PrivacyControl {
            name: "Data Accuracy".to_string(),
            description: "Ensure data is accurate and up-to-date".to_string(),
            implemented: true,
            effectiveness: 80.0,
            scope: ControlScope::DataProcessing,
            testing_frequency: "Real-time".to_string(),
        });
        
        // Security
        self.privacy_controls.insert("security".to_string(), PrivacyControl {
            name: "Data Security".to_string(),
            description: "Protect data with appropriate security measures".to_string(),
            implemented: true,
            effectiveness: 95.0,
            scope: ControlScope::DataStorage,
            testing_frequency: "Continuous".to_string(),
        });
        
        // Transparency
        self.privacy_controls.insert("transparency".to_string(), PrivacyControl {
            name: "Transparency".to_string(),
            description: "Provide clear information about data processing".to_string(),
            implemented: false, // Need privacy policy
            effectiveness: 40.0,
            scope: ControlScope::Transparency,
            testing_frequency: "Monthly".to_string(),
        });
        
        // User control
        self.privacy_controls.insert("user_control".to_string(), PrivacyControl {
            name: "User Control".to_string(),
            description: "Enable users to control their data".to_string(),
            implemented: false, // Need user rights interface
            effectiveness: 30.0,
            scope: ControlScope::UserRights,
            testing_frequency: "Weekly".to_string(),
        });
        
        // Consent management
        self.privacy_controls.insert("consent_management".to_string(), PrivacyControl {
            name: "Consent Management".to_string(),
            description: "Obtain and manage user consent appropriately".to_string(),
            implemented: true,
            effectiveness: 75.0,
            scope: ControlScope::DataCollection,
            testing_frequency: "Real-time".to_string(),
        });
        
        // Data sharing controls
        self.privacy_controls.insert("sharing_controls".to_string(), PrivacyControl {
            name: "Data Sharing Controls".to_string(),
            description: "Control and secure data sharing with third parties".to_string(),
            implemented: true,
            effectiveness: 85.0,
            scope: ControlScope::DataSharing,
            testing_frequency: "Continuous".to_string(),
        });
    }
    
    fn initialize_privacy_risks(&mut self) {
        // Device fingerprinting risk
        self.risk_assessments.push(PrivacyRisk {
            id: "PR001".to_string(),
            description: "Device fingerprinting through BLE characteristics and behavior patterns".to_string(),
            likelihood: RiskLikelihood::Medium,
            impact: RiskImpact::Moderate,
            affected_data_types: vec![DataType::DeviceIdentifiers, DataType::UsagePatterns],
            mitigation_measures: vec![
                "MAC address randomization".to_string(),
                "Behavior pattern obfuscation".to_string(),
                "Rotating device characteristics".to_string(),
            ],
        });
        
        // Network topology analysis
        self.risk_assessments.push(PrivacyRisk {
            id: "PR002".to_string(),
            description: "Privacy breach through network topology analysis and traffic correlation".to_string(),
            likelihood: RiskLikelihood::Low,
            impact: RiskImpact::Minor,
            affected_data_types: vec![DataType::NetworkTopology, DataType::CommunicationMetadata],
            mitigation_measures: vec![
                "Onion routing implementation".to_string(),
                "Dummy traffic generation".to_string(),
                "Mesh path obfuscation".to_string(),
            ],
        });
        
        // Game pattern analysis
        self.risk_assessments.push(PrivacyRisk {
            id: "PR003".to_string(),
            description: "User identification through game behavior and betting pattern analysis".to_string(),
            likelihood: RiskLikelihood::Low,
            impact: RiskImpact::Moderate,
            affected_data_types: vec![DataType::GameTransactions, DataType::UsagePatterns],
            mitigation_measures: vec![
                "Behavior normalization".to_string(),
                "Privacy-preserving game analytics".to_string(),
                "User-controlled analytics opt-out".to_string(),
            ],
        });
        
        // Cross-border data transfer
        self.risk_assessments.push(PrivacyRisk {
            id: "PR004".to_string(),
            description: "Privacy risks from cross-border data transfers in P2P network".to_string(),
            likelihood: RiskLikelihood::High,
            impact: RiskImpact::Moderate,
            affected_data_types: vec![
                DataType::GameTransactions,
                DataType::DeviceIdentifiers,
                DataType::CommunicationMetadata,
            ],
            mitigation_measures: vec![
                "Data localization preferences".to_string(),
                "Jurisdiction-aware routing".to_string(),
                "Legal basis documentation".to_string(),
            ],
        });
        
        // Key compromise
        self.risk_assessments.push(PrivacyRisk {
            id: "PR005".to_string(),
            description: "Privacy breach through cryptographic key compromise or extraction".to_string(),
            likelihood: RiskLikelihood::VeryLow,
            impact: RiskImpact::Severe,
            affected_data_types: vec![DataType::CryptographicKeys],
            mitigation_measures: vec![
                "Hardware security module integration".to_string(),
                "Key rotation policies".to_string(),
                "Secure key derivation".to_string(),
                "Forward secrecy implementation".to_string(),
            ],
        });
    }
    
    fn initialize_legal_bases(&mut self) {
        self.legal_bases.insert("contract".to_string(), LegalBasis {
            regulation: "GDPR Article 6(1)(b)".to_string(),
            basis_type: "Contract Performance".to_string(),
            description: "Processing necessary for performance of gaming contract".to_string(),
            conditions: vec![
                "Clear gaming terms and conditions".to_string(),
                "User agreement to participate".to_string(),
                "Processing limited to game functionality".to_string(),
            ],
            documentation: "Terms of Service and Gaming Agreement".to_string(),
        });
        
        self.legal_bases.insert("legitimate_interests".to_string(), LegalBasis {
            regulation: "GDPR Article 6(1)(f)".to_string(),
            basis_type: "Legitimate Interests".to_string(),
            description: "Legitimate interests in P2P network functionality".to_string(),
            conditions: vec![
                "Balancing test conducted".to_string(),
                "User interests considered".to_string(),
                "No override of fundamental rights".to_string(),
            ],
            documentation: "Legitimate Interest Assessment (LIA)".to_string(),
        });
        
        self.legal_bases.insert("consent".to_string(), LegalBasis {
            regulation: "GDPR Article 6(1)(a)".to_string(),
            basis_type: "Consent".to_string(),
            description: "User consent for optional features and analytics".to_string(),
            conditions: vec![
                "Freely given consent".to_string(),
                "Specific and informed".to_string(),
                "Easily withdrawable".to_string(),
                "Granular consent options".to_string(),
            ],
            documentation: "Consent Management Records".to_string(),
        });
    }
    
    pub async fn conduct_assessment(&self) -> Result<PrivacyAssessmentResult, Box<dyn std::error::Error>> {
        println!("🔍 Conducting comprehensive privacy assessment...");
        
        // Calculate component scores
        let data_minimization_score = self.assess_data_minimization();
        let purpose_limitation_score = self.assess_purpose_limitation();
        let transparency_score = self.assess_transparency();
        let security_score = self.assess_security();
        let user_control_score = self.assess_user_control();
        
        // Calculate overall score
        let overall_privacy_score = (data_minimization_score + purpose_limitation_score + 
                                   transparency_score + security_score + user_control_score) / 5.0;
        
        // Assess privacy risks
        let privacy_risks = self.assess_privacy_risks();
        
        // Generate recommendations
        let recommendations = self.generate_privacy_recommendations();
        
        // Identify compliance gaps
        let compliance_gaps = self.identify_compliance_gaps();
        
        println!("  ✅ Privacy assessment completed. Overall score: {:.1}%", overall_privacy_score);
        
        Ok(PrivacyAssessmentResult {
            overall_privacy_score,
            data_minimization_score,
            purpose_limitation_score,
            transparency_score,
            security_score,
            user_control_score,
            privacy_risks,
            recommendations,
            compliance_gaps,
        })
    }
    
    fn assess_data_minimization(&self) -> f64 {
        let control = self.privacy_controls.get("data_minimization").unwrap();
        
        // Check if data flows collect only necessary data
        let unnecessary_data_flows = self.data_flows.iter()
            .filter(|df| df.data_types.len() > 3) // Simple heuristic
            .count();
        
        let penalty = (unnecessary_data_flows as f64) * 10.0;
        (control.effectiveness - penalty).max(0.0)
    }
    
    fn assess_purpose_limitation(&self) -> f64 {
        let control = self.privacy_controls.get("purpose_limitation").unwrap();
        
        // Check if all data flows have specific purposes
        let flows_with_vague_purposes = self.data_flows.iter()
            .filter(|df| df.processing_purpose.len() < 20) // Simple heuristic
            .count();
        
        let penalty = (flows_with_vague_purposes as f64) * 5.0;
        (control.effectiveness - penalty).max(0.0)
    }
    
    fn assess_transparency(&self) -> f64 {
        let control = self.privacy_controls.get("transparency").unwrap();
        
        // Transparency is mainly based on documentation and user notices
        control.effectiveness
    }
    
    fn assess_security(&self) -> f64 {
        let control = self.privacy_controls.get("security").unwrap();
        
        // Check security measures across data flows
        let total_security_measures: usize = self.data_flows.iter()
            .map(|df| df.security_measures.len())
            .sum();
        
        let average_security = total_security_measures as f64 / self.data_flows.len() as f64;
        let security_bonus = (average_security - 2.0) * 5.0; // Bonus for >2 measures per flow
        
        (control.effectiveness + security_bonus).min(100.0)
    }
    
    fn assess_user_control(&self) -> f64 {
        let control = self.privacy_controls.get("user_control").unwrap();
        control.effectiveness
    }
    
    fn assess_privacy_risks(&self) -> Vec<PrivacyRiskAssessment> {
        self.risk_assessments.iter().map(|risk| {
            let risk_level = self.calculate_risk_level(&risk.likelihood, &risk.impact);
            let mitigation_status = if risk.mitigation_measures.len() >= 2 {
                "Adequately mitigated"
            } else {
                "Requires additional mitigation"
            };
            
            let residual_risk = match (&risk.likelihood, &risk.impact) {
                (RiskLikelihood::VeryLow | RiskLikelihood::Low, _) => "Low",
                (_, RiskImpact::Minimal | RiskImpact::Minor) => "Low",
                (RiskLikelihood::Medium, RiskImpact::Moderate) => "Medium",
                _ => "High",
            };
            
            PrivacyRiskAssessment {
                risk_id: risk.id.clone(),
                description: risk.description.clone(),
                likelihood: format!("{:?}", risk.likelihood),
                impact: format!("{:?}", risk.impact),
                risk_level,
                mitigation_status: mitigation_status.to_string(),
                residual_risk: residual_risk.to_string(),
            }
        }).collect()
    }
    
    fn calculate_risk_level(&self, likelihood: &RiskLikelihood, impact: &RiskImpact) -> String {
        match (likelihood, impact) {
            (RiskLikelihood::VeryHigh, RiskImpact::Severe) => "Critical",
            (RiskLikelihood::High, RiskImpact::Major | RiskImpact::Severe) => "High",
            (RiskLikelihood::VeryHigh, RiskImpact::Major | RiskImpact::Moderate) => "High",
            (RiskLikelihood::Medium, RiskImpact::Major | RiskImpact::Severe) => "High",
            (RiskLikelihood::Medium, RiskImpact::Moderate) => "Medium",
            (RiskLikelihood::High, RiskImpact::Moderate | RiskImpact::Minor) => "Medium",
            (RiskLikelihood::Low, RiskImpact::Major | RiskImpact::Severe) => "Medium",
            _ => "Low",
        }.to_string()
    }
    
    fn generate_privacy_recommendations(&self) -> Vec<PrivacyRecommendation> {
        let mut recommendations = Vec::new();
        
        // Transparency improvements
        if self.privacy_controls.get("transparency").unwrap().effectiveness < 70.0 {
            recommendations.push(PrivacyRecommendation {
                priority: "High".to_string(),
                recommendation: "Implement comprehensive privacy policy and user notices".to_string(),
                rationale: "Transparency is fundamental to privacy compliance".to_string(),
                implementation_effort: "2 weeks".to_string(),
                compliance_benefit: "GDPR Articles 12-14 compliance".to_string(),
            });
        }
        
        // User control enhancements
        if self.privacy_controls.get("user_control").unwrap().effectiveness < 60.0 {
            recommendations.push(PrivacyRecommendation {
                priority: "High".to_string(),
                recommendation: "Develop user rights management interface".to_string(),
                rationale: "Users need practical control over their personal data".to_string(),
                implementation_effort: "3 weeks".to_string(),
                compliance_benefit: "GDPR Articles 15-22 compliance".to_string(),
            });
        }
        
        // Cross-border transfer safeguards
        recommendations.push(PrivacyRecommendation {
            priority: "Medium".to_string(),
            recommendation: "Implement jurisdiction-aware data routing".to_string(),
            rationale: "P2P networks may transfer data across borders requiring safeguards".to_string(),
            implementation_effort: "4 weeks".to_string(),
            compliance_benefit: "GDPR Chapter V compliance".to_string(),
        });
        
        // Privacy-preserving analytics
        recommendations.push(PrivacyRecommendation {
            priority: "Medium".to_string(),
            recommendation: "Implement differential privacy for optional analytics".to_string(),
            rationale: "Enable privacy-preserving system improvements".to_string(),
            implementation_effort: "3 weeks".to_string(),
            compliance_benefit: "Enhanced privacy by design".to_string(),
        });
        
        // Biometric data handling
        recommendations.push(PrivacyRecommendation {
            priority: "Low".to_string(),
            recommendation: "Develop biometric data protection framework for future features".to_string(),
            rationale: "Prepare for potential biometric authentication features".to_string(),
            implementation_effort: "2 weeks".to_string(),
            compliance_benefit: "GDPR Article 9 special categories compliance".to_string(),
        });
        
        recommendations
    }
    
    fn identify_compliance_gaps(&self) -> Vec<PrivacyGap> {
        let mut gaps = Vec::new();
        
        // Privacy policy gap
        if !self.privacy_controls.get("transparency").unwrap().implemented {
            gaps.push(PrivacyGap {
                requirement: "GDPR Article 13 - Information to be provided".to_string(),
                current_status: "No privacy policy implemented".to_string(),
                gap_description: "Users not informed about data processing activities".to_string(),
                remediation_plan: "Draft and implement comprehensive privacy policy".to_string(),
                timeline: "2 weeks".to_string(),
            });
        }
        
        // User rights interface gap
        if !self.privacy_controls.get("user_control").unwrap().implemented {
            gaps.push(PrivacyGap {
                requirement: "GDPR Articles 15-22 - Individual rights".to_string(),
                current_status: "No user rights management system".to_string(),
                gap_description: "Users cannot exercise their privacy rights".to_string(),
                remediation_plan: "Develop user rights management interface and backend".to_string(),
                timeline: "4 weeks".to_string(),
            });
        }
        
        // Data protection impact assessment
        gaps.push(PrivacyGap {
            requirement: "GDPR Article 35 - Data protection impact assessment".to_string(),
            current_status: "Informal privacy assessment conducted".to_string(),
            gap_description: "Formal DPIA required for systematic monitoring".to_string(),
            remediation_plan: "Conduct formal DPIA with stakeholder consultation".to_string(),
            timeline: "3 weeks".to_string(),
        });
        
        // International transfer documentation
        gaps.push(PrivacyGap {
            requirement: "GDPR Chapter V - International transfers".to_string(),
            current_status: "P2P transfers occur without formal documentation".to_string(),
            gap_description: "Cross-border transfers lack adequate safeguards documentation".to_string(),
            remediation_plan: "Document transfer mechanisms and implement safeguards".to_string(),
            timeline: "2 weeks".to_string(),
        });
        
        gaps
    }
}