//! Synonym tables mapping canonical fields to the keys/tags used by each
//! payload dialect. Entries are ordered: the first alias that yields a value wins.

use rxscan_core::CanonicalField::{self, *};

/// Read-only alias table for one payload dialect.
#[derive(Debug)]
pub struct AliasTable {
    pub dialect: &'static str,
    entries: &'static [(CanonicalField, &'static [&'static str])],
}

impl AliasTable {
    /// Aliases for a field, in priority order. Empty if the dialect never carries it.
    pub fn aliases(&self, field: CanonicalField) -> &'static [&'static str] {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, aliases)| *aliases)
            .unwrap_or(&[])
    }

    /// All (field, aliases) entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (CanonicalField, &'static [&'static str])> {
        self.entries.iter().copied()
    }

    /// Reverse lookup: the field a key belongs to. Keys are compared case-sensitively.
    pub fn field_for(&self, key: &str) -> Option<CanonicalField> {
        self.entries
            .iter()
            .find(|(_, aliases)| aliases.contains(&key))
            .map(|(f, _)| *f)
    }
}

/// Element names in markup payloads (e.g. `<dg>Nexium</dg>`).
pub static MARKUP_TAGS: AliasTable = AliasTable {
    dialect: "markup",
    entries: &[
        (PatientName, &["n", "name", "patient"]),
        (PatientDob, &["dob", "birth_date"]),
        (MedicationName, &["dg", "drug", "medication", "med"]),
        (MedicationStrength, &["strength", "dose"]),
        (NdcNumber, &["ndc"]),
        (PrescriberName, &["pm", "prescriber", "doctor"]),
        (DateFilled, &["dt", "date", "dispensed"]),
        (Directions, &["in", "instructions", "directions", "sig"]),
        (RxNumber, &["id", "rx", "prescription_id"]),
        (PharmacyName, &["pharmacy", "pharm"]),
        (Quantity, &["qty", "quantity"]),
        (Refills, &["refills"]),
    ],
};

/// Object keys in JSON payloads.
pub static JSON_KEYS: AliasTable = AliasTable {
    dialect: "json",
    entries: &[
        (PatientName, &["patient_name", "patientName", "name", "pt_name"]),
        (PatientDob, &["patient_dob", "patientDOB", "dob", "birth_date"]),
        (MedicationName, &["medication_name", "medicationName", "drug_name", "med_name"]),
        (MedicationStrength, &["medication_strength", "strength", "dose"]),
        (NdcNumber, &["ndc_number", "ndc", "NDC"]),
        (PrescriberName, &["prescriber_name", "prescriber", "doctor", "physician"]),
        (PharmacyName, &["pharmacy_name", "pharmacy", "pharm_name"]),
        (RxNumber, &["rx_number", "prescription_number", "rx_num", "rx"]),
        (DateFilled, &["date_filled", "fill_date", "dispensed_date"]),
        (Directions, &["directions", "sig", "instructions"]),
        (Quantity, &["quantity", "qty", "amount"]),
        (Refills, &["refills", "refills_remaining"]),
    ],
};

/// Lower-cased line keys in `KEY: value` payloads.
pub static LINE_KEYS: AliasTable = AliasTable {
    dialect: "key_value",
    entries: &[
        (PatientName, &["patient", "name", "pt"]),
        (PatientDob, &["dob", "birth"]),
        (MedicationName, &["drug", "medication", "med"]),
        (MedicationStrength, &["strength", "dose"]),
        (NdcNumber, &["ndc"]),
        (PrescriberName, &["prescriber", "doctor", "physician"]),
        (PharmacyName, &["pharmacy", "pharm"]),
        (RxNumber, &["rx", "prescription"]),
        (DateFilled, &["filled", "date"]),
        (Directions, &["directions", "sig"]),
        (Quantity, &["qty", "quantity"]),
        (Refills, &["refills"]),
    ],
};
