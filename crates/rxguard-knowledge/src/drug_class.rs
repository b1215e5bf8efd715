//! Therapeutic class lookup for display alongside findings.

/// Known classes and their member drugs, in lookup order.
const DRUG_CLASSES: &[(&str, &[&str])] = &[
    ("PDE5 inhibitors", &["sildenafil", "tadalafil", "vardenafil", "avanafil"]),
    ("ACE inhibitors", &["lisinopril", "enalapril", "ramipril", "benazepril", "captopril"]),
    ("ARBs", &["losartan", "valsartan", "irbesartan", "olmesartan", "candesartan"]),
    ("Beta blockers", &["metoprolol", "carvedilol", "atenolol", "propranolol", "bisoprolol"]),
    ("Statins", &["atorvastatin", "simvastatin", "rosuvastatin", "pravastatin", "lovastatin"]),
    ("SSRIs", &["sertraline", "fluoxetine", "paroxetine", "citalopram", "escitalopram"]),
    ("Biguanides", &["metformin"]),
    ("5-alpha reductase inhibitors", &["finasteride", "dutasteride"]),
    ("GLP-1 agonists", &["semaglutide", "liraglutide", "dulaglutide", "exenatide"]),
    ("Anticoagulants", &["warfarin", "rivaroxaban", "apixaban", "dabigatran", "edoxaban"]),
    ("Antiplatelet agents", &["aspirin", "clopidogrel", "prasugrel", "ticagrelor"]),
    ("Nitrates", &["nitroglycerin", "isosorbide", "isordil"]),
    ("Triptans", &["sumatriptan", "rizatriptan", "zolmitriptan", "eletriptan"]),
    ("Opioids", &["morphine", "codeine", "oxycodone", "hydrocodone", "fentanyl", "tramadol"]),
    ("NSAIDs", &["ibuprofen", "naproxen", "meloxicam", "ketorolac", "celecoxib", "diclofenac"]),
];

/// Return the therapeutic class of `drug_name`, if it is a known member.
///
/// Uses the same two-way containment as the matcher, on the lowercased name,
/// so "Atorvastatin calcium" resolves to "Statins".
pub fn drug_class_of(drug_name: &str) -> Option<&'static str> {
    let name = drug_name.trim().to_lowercase();
    if name.is_empty() {
        return None;
    }

    DRUG_CLASSES
        .iter()
        .find(|(_, members)| {
            members
                .iter()
                .any(|member| name.contains(member) || member.contains(name.as_str()))
        })
        .map(|(class, _)| *class)
}
