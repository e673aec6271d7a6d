use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Decoded from a machine-readable code symbol.
    #[default]
    CodeScan,
    /// Recovered from label text by OCR.
    TextFallback,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CodeScan => f.write_str("code_scan"),
            Self::TextFallback => f.write_str("text_fallback"),
        }
    }
}

/// The twelve prescription fields a parser can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    PatientName,
    PatientDob,
    MedicationName,
    MedicationStrength,
    NdcNumber,
    PrescriberName,
    PharmacyName,
    RxNumber,
    DateFilled,
    Directions,
    Quantity,
    Refills,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 12] = [
        Self::PatientName,
        Self::PatientDob,
        Self::MedicationName,
        Self::MedicationStrength,
        Self::NdcNumber,
        Self::PrescriberName,
        Self::PharmacyName,
        Self::RxNumber,
        Self::DateFilled,
        Self::Directions,
        Self::Quantity,
        Self::Refills,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PatientName => "patient_name",
            Self::PatientDob => "patient_dob",
            Self::MedicationName => "medication_name",
            Self::MedicationStrength => "medication_strength",
            Self::NdcNumber => "ndc_number",
            Self::PrescriberName => "prescriber_name",
            Self::PharmacyName => "pharmacy_name",
            Self::RxNumber => "rx_number",
            Self::DateFilled => "date_filled",
            Self::Directions => "directions",
            Self::Quantity => "quantity",
            Self::Refills => "refills",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format-independent prescription record.
///
/// Built once by a parser through [`RecordBuilder`] and read-only afterwards.
/// `raw_payload` keeps the exact input string for audit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(default)]
    patient_name: Option<String>,
    #[serde(default)]
    patient_dob: Option<String>,
    #[serde(default)]
    medication_name: Option<String>,
    #[serde(default)]
    medication_strength: Option<String>,
    #[serde(default)]
    ndc_number: Option<String>,
    #[serde(default)]
    prescriber_name: Option<String>,
    #[serde(default)]
    pharmacy_name: Option<String>,
    #[serde(default)]
    rx_number: Option<String>,
    #[serde(default)]
    date_filled: Option<String>,
    #[serde(default)]
    directions: Option<String>,
    #[serde(default)]
    quantity: Option<String>,
    #[serde(default)]
    refills: Option<String>,
    #[serde(default)]
    raw_payload: String,
    #[serde(default)]
    provenance: Provenance,
}

impl CanonicalRecord {
    /// Raw value of a field, including empty strings.
    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Value of a field if it is set to something other than the empty string.
    pub fn present(&self, field: CanonicalField) -> Option<&str> {
        self.get(field).filter(|v| !v.is_empty())
    }

    pub fn raw_payload(&self) -> &str {
        &self.raw_payload
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// True when no canonical field carries a value.
    pub fn is_empty(&self) -> bool {
        CanonicalField::ALL.iter().all(|f| self.present(*f).is_none())
    }

    /// Fields with a non-empty value, in canonical order.
    pub fn populated(&self) -> impl Iterator<Item = (CanonicalField, &str)> + '_ {
        CanonicalField::ALL
            .iter()
            .filter_map(|f| self.present(*f).map(|v| (*f, v)))
    }

    fn slot(&self, field: CanonicalField) -> &Option<String> {
        match field {
            CanonicalField::PatientName => &self.patient_name,
            CanonicalField::PatientDob => &self.patient_dob,
            CanonicalField::MedicationName => &self.medication_name,
            CanonicalField::MedicationStrength => &self.medication_strength,
            CanonicalField::NdcNumber => &self.ndc_number,
            CanonicalField::PrescriberName => &self.prescriber_name,
            CanonicalField::PharmacyName => &self.pharmacy_name,
            CanonicalField::RxNumber => &self.rx_number,
            CanonicalField::DateFilled => &self.date_filled,
            CanonicalField::Directions => &self.directions,
            CanonicalField::Quantity => &self.quantity,
            CanonicalField::Refills => &self.refills,
        }
    }

    fn slot_mut(&mut self, field: CanonicalField) -> &mut Option<String> {
        match field {
            CanonicalField::PatientName => &mut self.patient_name,
            CanonicalField::PatientDob => &mut self.patient_dob,
            CanonicalField::MedicationName => &mut self.medication_name,
            CanonicalField::MedicationStrength => &mut self.medication_strength,
            CanonicalField::NdcNumber => &mut self.ndc_number,
            CanonicalField::PrescriberName => &mut self.prescriber_name,
            CanonicalField::PharmacyName => &mut self.pharmacy_name,
            CanonicalField::RxNumber => &mut self.rx_number,
            CanonicalField::DateFilled => &mut self.date_filled,
            CanonicalField::Directions => &mut self.directions,
            CanonicalField::Quantity => &mut self.quantity,
            CanonicalField::Refills => &mut self.refills,
        }
    }
}

/// Mutable staging area used by parsers. The only way to produce a record.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    fields: [Option<String>; 12],
    raw_payload: String,
    provenance: Provenance,
}

impl RecordBuilder {
    pub fn new(raw_payload: impl Into<String>) -> Self {
        Self {
            fields: Default::default(),
            raw_payload: raw_payload.into(),
            provenance: Provenance::CodeScan,
        }
    }

    pub fn provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    pub fn set_provenance(&mut self, provenance: Provenance) {
        self.provenance = provenance;
    }

    /// Overwrite a field.
    pub fn set(&mut self, field: CanonicalField, value: impl Into<String>) {
        self.fields[field.index()] = Some(value.into());
    }

    /// Set a field only if it has no non-empty value yet. Returns whether it was written.
    pub fn fill(&mut self, field: CanonicalField, value: impl Into<String>) -> bool {
        if self.is_filled(field) {
            return false;
        }
        self.set(field, value);
        true
    }

    /// Mark a field as present but valueless (e.g. a JSON `null`).
    pub fn clear(&mut self, field: CanonicalField) {
        self.fields[field.index()] = None;
    }

    pub fn is_filled(&self, field: CanonicalField) -> bool {
        self.fields[field.index()]
            .as_deref()
            .is_some_and(|v| !v.is_empty())
    }

    pub fn build(self) -> CanonicalRecord {
        let mut record = CanonicalRecord {
            raw_payload: self.raw_payload,
            provenance: self.provenance,
            ..Default::default()
        };
        for (field, value) in CanonicalField::ALL.iter().zip(self.fields) {
            *record.slot_mut(*field) = value;
        }
        record
    }
}
