use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Kind of report produced for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Materials,
    Supplier,
}

impl ReportKind {
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Materials => "materials",
            Self::Supplier => "supplier",
        }
    }
}

impl fmt::Display for ReportKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A report leaf value.
///
/// Models do not reliably return strings, so numbers, booleans and arrays are accepted and
/// flattened to text. Null, a missing key and the empty string all mean "no value".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text(Option<String>);

impl Text {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        Self(Some(value.into()))
    }

    /// The value, if present and non-empty
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref().filter(|value| !value.trim().is_empty())
    }
}

impl From<&str> for Text {
    #[inline]
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Serialize for Text {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Text {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self(flatten_value(Value::deserialize(deserializer)?)))
    }
}

fn flatten_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.into_iter().filter_map(flatten_value).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .into_iter()
                .filter_map(|(key, value)| flatten_value(value).map(|v| format!("{}: {}", key, v)))
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
    }
}

/// Parsed report, serialized as `{"materialsReport": …}` or `{"supplierReport": …}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportResult {
    MaterialsReport(MaterialsReport),
    SupplierReport(SupplierReport),
}

impl ReportResult {
    #[inline]
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::MaterialsReport(_) => ReportKind::Materials,
            Self::SupplierReport(_) => ReportKind::Supplier,
        }
    }
}

// Materials report

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialsReport {
    pub introduction: Introduction,
    pub chemical_profile: ChemicalProfile,
    pub manufacturing: Manufacturing,
    pub capacity: Capacity,
    pub pricing: MaterialsPricing,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Introduction {
    pub overview: Overview,
    pub properties: PhysicalProperties,
    pub market_relevance: MarketRelevance,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Overview {
    pub core_function: Text,
    pub commercialization_date: Text,
    pub background_and_market_context: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicalProperties {
    pub appearance: Text,
    pub hazards: Text,
    pub characteristics: Text,
    pub safety: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketRelevance {
    pub industries: Text,
    pub demand_drivers: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChemicalProfile {
    pub identity: ChemicalIdentity,
    pub purity: Purity,
    pub properties: KeyProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChemicalIdentity {
    pub name: Text,
    pub formula: Text,
    pub cas: Text,
    pub synonyms: Text,
    pub molecular_weight: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Purity {
    pub grades: Text,
    pub quality_control: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyProperties {
    pub boiling_point: Text,
    pub polymerization_risks: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Manufacturing {
    pub methods: ProductionMethods,
    pub chemistry: ReactionChemistry,
    pub challenges: TechnicalChallenges,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductionMethods {
    pub pathways: Text,
    pub raw_materials: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReactionChemistry {
    pub conditions: Text,
    pub byproducts: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TechnicalChallenges {
    pub corrosion: Text,
    pub safety_protocols: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Capacity {
    pub overview: CapacityOverview,
    pub rates: UtilizationRates,
    pub locations: ManufacturingLocations,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CapacityOverview {
    pub hubs: Text,
    pub utilization_trends: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UtilizationRates {
    pub fluctuations: Text,
    pub drivers: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManufacturingLocations {
    pub regions: Text,
    pub emerging: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialsPricing {
    pub cost_drivers: CostDrivers,
    pub structures: PricingStructures,
    pub trends: PricingTrends,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CostDrivers {
    pub raw_materials: Text,
    pub logistics: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PricingStructures {
    pub volatility: Text,
    pub agreements: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PricingTrends {
    pub trajectories: Text,
    pub projections: Text,
}

// Supplier report

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SupplierReport {
    pub executive_summary: ExecutiveSummary,
    pub supplier_profiles: SupplierProfiles,
    pub quality: SupplierQuality,
    pub pricing: SupplierPricing,
    pub reliability: Reliability,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecutiveSummary {
    pub purpose: Purpose,
    pub highlights: Highlights,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Purpose {
    pub reason: Text,
    pub products: Text,
    pub evaluation_overview: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Highlights {
    pub differentiators: Text,
    pub findings: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SupplierProfiles {
    pub background: CompanyBackground,
    pub capabilities: Capabilities,
    pub geographic: GeographicPresence,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompanyBackground {
    pub history: Text,
    pub ownership: Text,
    pub leadership: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Capabilities {
    pub facilities: Text,
    pub volumes: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeographicPresence {
    pub distribution: Text,
    pub markets: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SupplierQuality {
    pub compliance: Compliance,
    pub assurance: QualityAssurance,
    pub audits: Audits,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Compliance {
    pub standards: Text,
    pub registrations: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QualityAssurance {
    pub testing: Text,
    pub traceability: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Audits {
    pub internal: Text,
    pub customer: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SupplierPricing {
    pub structures: ContractStructures,
    pub terms: PaymentTerms,
    pub negotiation: Negotiation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContractStructures {
    pub spot_vs_contract: Text,
    pub discounts: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentTerms {
    pub payment_days: Text,
    pub credit_risk: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Negotiation {
    pub index_pricing: Text,
    pub transparency: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reliability {
    pub performance: DeliveryPerformance,
    pub risks: RiskFactors,
    pub contingency: Contingency,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeliveryPerformance {
    pub delivery_metrics: Text,
    pub lead_time: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RiskFactors {
    pub factors: Text,
    pub disruptions: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contingency {
    pub redundancy: Text,
    pub routes: Text,
}
