//! Plain-text rendering of a record for terminals and API responses.

use rxscan_core::{CanonicalField, CanonicalRecord, Provenance};

use CanonicalField::*;

const RULE_WIDTH: usize = 50;

/// Labelled blocks of the full layout. A blank line follows every block but the last.
pub(crate) const SECTIONS: &[&[(CanonicalField, &str)]] = &[
    &[(PatientName, "Patient"), (PatientDob, "DOB")],
    &[
        (MedicationName, "Medication"),
        (MedicationStrength, "Strength"),
        (NdcNumber, "NDC"),
    ],
    &[(PrescriberName, "Prescriber"), (PharmacyName, "Pharmacy")],
    &[
        (RxNumber, "Rx Number"),
        (DateFilled, "Date Filled"),
        (Quantity, "Quantity"),
        (Refills, "Refills"),
    ],
    &[(Directions, "Directions")],
];

/// Render a record. Empty fields are omitted.
pub fn format(record: &CanonicalRecord) -> String {
    let lines = match record.provenance() {
        Provenance::TextFallback => text_fallback_lines(record),
        Provenance::CodeScan => full_lines(record),
    };
    lines.join("\n")
}

fn banner(title: &str) -> Vec<String> {
    let rule = "=".repeat(RULE_WIDTH);
    vec![rule.clone(), title.to_string(), rule]
}

fn full_lines(record: &CanonicalRecord) -> Vec<String> {
    let mut lines = banner("PRESCRIPTION INFORMATION");
    for (i, section) in SECTIONS.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        for (field, label) in section.iter() {
            if let Some(value) = record.present(*field) {
                lines.push(format!("{label}: {value}"));
            }
        }
    }
    lines
}

fn text_fallback_lines(record: &CanonicalRecord) -> Vec<String> {
    let mut lines = banner("PRESCRIPTION INFORMATION (Text Detection)");
    lines.push(String::new());

    let mut found = Vec::new();
    if let Some(ndc) = record.present(NdcNumber) {
        lines.push(format!("NDC Number: {ndc}"));
        found.push("NDC");
    }
    if let Some(rx) = record.present(RxNumber) {
        lines.push(format!("RX Number: {rx}"));
        found.push("RX");
    }

    lines.push(String::new());
    if !found.is_empty() {
        lines.push(format!("Note: {} number(s) detected from text.", found.join(", ")));
    }
    lines.push("No additional prescription information available.".to_string());
    lines.push("For complete prescription data, use a QR code.".to_string());
    lines
}
