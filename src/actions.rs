//! Custom actions the conversational backend calls back into.
//!
//! Each action reads the `certificate_type` slot, consults the certificate
//! catalog and answers with a single formatted utterance. Missing slots and
//! unknown certificates produce a prompt or an apology instead.

use crate::catalog::{CertificateCatalog, display_name, humanize_key, title_case};
use crate::intent::CERTIFICATE_TYPE_SLOT;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionName {
    ResetCertificateType,
    CertificateInfo,
    ApplicationProcess,
    DocumentsList,
    CostInfo,
    PassportTatkalInfo,
    LicenseTypes,
    DuplicateInfo,
    IssuingAuthority,
    CheckEligibility,
    PassportTypes,
    OnlineApplicationInfo,
    ProcessingTime,
    RationCardTypes,
    ValidityInfo,
}

impl ActionName {
    pub const ALL: [ActionName; 15] = [
        ActionName::ResetCertificateType,
        ActionName::CertificateInfo,
        ActionName::ApplicationProcess,
        ActionName::DocumentsList,
        ActionName::CostInfo,
        ActionName::PassportTatkalInfo,
        ActionName::LicenseTypes,
        ActionName::DuplicateInfo,
        ActionName::IssuingAuthority,
        ActionName::CheckEligibility,
        ActionName::PassportTypes,
        ActionName::OnlineApplicationInfo,
        ActionName::ProcessingTime,
        ActionName::RationCardTypes,
        ActionName::ValidityInfo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionName::ResetCertificateType => "action_reset_certificate_type",
            ActionName::CertificateInfo => "action_provide_certificate_info",
            ActionName::ApplicationProcess => "action_provide_application_process",
            ActionName::DocumentsList => "action_provide_documents_list",
            ActionName::CostInfo => "action_provide_cost_info",
            ActionName::PassportTatkalInfo => "action_provide_passport_tatkal_info",
            ActionName::LicenseTypes => "action_provide_license_types",
            ActionName::DuplicateInfo => "action_provide_duplicate_info",
            ActionName::IssuingAuthority => "action_provide_issuing_authority",
            ActionName::CheckEligibility => "action_check_eligibility",
            ActionName::PassportTypes => "action_provide_passport_types",
            ActionName::OnlineApplicationInfo => "action_provide_online_application_info",
            ActionName::ProcessingTime => "action_provide_processing_time",
            ActionName::RationCardTypes => "action_provide_ration_card_types",
            ActionName::ValidityInfo => "action_provide_validity_info",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == name)
    }
}

impl std::fmt::Display for ActionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversation event returned to the backend alongside the utterances.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ActionEvent {
    Slot { name: String, value: Value },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionOutcome {
    pub events: Vec<ActionEvent>,
    pub responses: Vec<String>,
}

impl ActionOutcome {
    fn utter(text: String) -> Self {
        Self {
            events: Vec::new(),
            responses: vec![text],
        }
    }
}

/// Run `action` against `catalog` with the current `certificate_type` slot.
pub fn run_action(
    action: ActionName,
    catalog: &CertificateCatalog,
    cert_type: Option<&str>,
) -> ActionOutcome {
    let reply = match action {
        ActionName::ResetCertificateType => {
            return ActionOutcome {
                events: vec![ActionEvent::Slot {
                    name: CERTIFICATE_TYPE_SLOT.to_string(),
                    value: Value::Null,
                }],
                responses: Vec::new(),
            };
        }
        ActionName::CertificateInfo => certificate_info(catalog, cert_type),
        ActionName::ApplicationProcess => application_process(catalog, cert_type),
        ActionName::DocumentsList => documents_list(catalog, cert_type),
        ActionName::CostInfo => cost_info(catalog, cert_type),
        ActionName::PassportTatkalInfo => passport_tatkal_info(catalog),
        ActionName::LicenseTypes => license_types(catalog),
        ActionName::DuplicateInfo => duplicate_info(catalog, cert_type),
        ActionName::IssuingAuthority => issuing_authority(catalog, cert_type),
        ActionName::CheckEligibility => check_eligibility(catalog, cert_type),
        ActionName::PassportTypes => passport_types(catalog),
        ActionName::OnlineApplicationInfo => online_application_info(catalog, cert_type),
        ActionName::ProcessingTime => processing_time(catalog, cert_type),
        ActionName::RationCardTypes => ration_card_types(catalog),
        ActionName::ValidityInfo => validity_info(catalog, cert_type),
    };
    ActionOutcome::utter(reply.unwrap_or_else(|apology| apology))
}

/// `Ok` is the answer, `Err` the prompt or apology sent instead.
type Reply = Result<String, String>;

fn find<'c>(
    catalog: &'c CertificateCatalog,
    cert_type: Option<&str>,
    ask: &str,
    unknown: impl FnOnce(&str) -> String,
) -> Result<(String, &'c Value), String> {
    let Some(cert_type) = cert_type.filter(|c| !c.is_empty()) else {
        return Err(ask.to_string());
    };
    match catalog.lookup(cert_type) {
        Some(info) => Ok((cert_type.to_string(), info)),
        None => Err(unknown(cert_type)),
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn str_or(info: &Value, key: &str, default: &str) -> String {
    info.get(key).map(text).unwrap_or_else(|| default.to_string())
}

fn first_truthy<'a>(info: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| info.get(*key))
        .find(|value| truthy(value))
}

fn first_present<'a>(info: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| info.get(*key))
}

fn is_passport(cert_type: &str) -> bool {
    matches!(cert_type.to_lowercase().as_str(), "passport" | "passports")
}

fn is_driving_license(cert_type: &str) -> bool {
    matches!(
        cert_type.to_lowercase().as_str(),
        "driving license" | "driving_license"
    )
}

fn entry<'c>(catalog: &'c CertificateCatalog, keys: &[&str]) -> Option<&'c Value> {
    keys.iter().find_map(|key| catalog.get(key))
}

fn bullets(map: &Map<String, Value>, out: &mut Vec<String>) {
    for (key, value) in map {
        out.push(format!("• {}: {}", humanize_key(key), text(value)));
    }
}

fn nested_bullets(map: &Map<String, Value>, header_icon: &str, out: &mut Vec<String>) {
    for (key, value) in map {
        match value {
            Value::Object(sub) => {
                out.push(format!("{header_icon} {}:", humanize_key(key)));
                for (sub_key, sub_value) in sub {
                    out.push(format!("  • {}: {}", humanize_key(sub_key), text(sub_value)));
                }
            }
            other => out.push(format!("• {}: {}", humanize_key(key), text(other))),
        }
    }
}

fn numbered(steps: &[Value], out: &mut Vec<String>) {
    for (i, step) in steps.iter().enumerate() {
        out.push(format!("{}. {}", i + 1, text(step)));
    }
}

fn certificate_info(catalog: &CertificateCatalog, cert_type: Option<&str>) -> Reply {
    let (cert_type, info) = find(
        catalog,
        cert_type,
        "Please specify which certificate you need information about.",
        |c| format!("Sorry, I don't have information about {c} certificates."),
    )?;

    let description = first_present(info, &["definition", "purpose"])
        .map(text)
        .unwrap_or_else(|| "No description available".to_string());
    let issuing = str_or(info, "issuing_authority", "Not specified");

    let mut lines = vec![
        format!("📌 *{}*", display_name(info, &cert_type)),
        String::new(),
        "📝 Description:".to_string(),
        format!("{description}\n"),
        String::new(),
        "🏛️ Issuing Authority:".to_string(),
        format!("{issuing}\n"),
    ];

    if is_passport(&cert_type)
        && let Some(Value::Object(types)) = info.get("types_of_passport")
    {
        lines.push(String::new());
        lines.push("📋 Types Available:\n".to_string());
        for (kind, desc) in types {
            lines.push(format!("• {}: {}\n", humanize_key(kind), text(desc)));
        }
    }
    Ok(lines.join("\n"))
}

fn application_process(catalog: &CertificateCatalog, cert_type: Option<&str>) -> Reply {
    let (cert_type, info) = find(
        catalog,
        cert_type,
        "For which certificate would you like the application process?",
        |c| format!("Sorry, I don't have application process details for {c}."),
    )?;

    let process = match (info.get("application_process"), info.get("learner_license")) {
        (Some(Value::Array(steps)), _) => Some((steps.as_slice(), None)),
        (Some(Value::Object(process)), _) => process_steps(process),
        (Some(_), _) => None,
        (None, Some(Value::Object(process))) => process_steps(process),
        (None, _) => None,
    };
    let Some((steps, details)) = process else {
        return Err(format!(
            "Sorry, application process not available for {cert_type}."
        ));
    };

    let mut lines = vec![
        format!(
            "📋 Application Process for {}",
            display_name(info, &cert_type)
        ),
        String::new(),
        "🔹 Steps:".to_string(),
    ];
    for (i, step) in steps.iter().enumerate() {
        lines.push(format!("{}. {}\n", i + 1, text(step)));
    }

    if let Some(details) = details {
        if let Some(time) = details.get("processing_time") {
            lines.push(String::new());
            lines.push("⏱️ Processing Time:".to_string());
            match time {
                Value::Object(times) => {
                    for (kind, duration) in times {
                        lines.push(format!("• {}: {}", title_case(kind), text(duration)));
                    }
                }
                other => lines.push(text(other)),
            }
        }
        if let Some(place) = details.get("where_to_apply") {
            lines.push(String::new());
            lines.push("📍 Where to Apply:".to_string());
            lines.push(text(place));
        }
    }
    Ok(lines.join("\n"))
}

fn process_steps(process: &Map<String, Value>) -> Option<(&[Value], Option<&Map<String, Value>>)> {
    match process.get("steps") {
        Some(Value::Array(steps)) => Some((steps.as_slice(), Some(process))),
        _ => None,
    }
}

fn documents_list(catalog: &CertificateCatalog, cert_type: Option<&str>) -> Reply {
    let (cert_type, info) = find(
        catalog,
        cert_type,
        "For which certificate would you like the required documents?",
        |c| format!("Sorry, I don't have document requirements for {c}."),
    )?;

    let docs = match info.get("documents_needed") {
        Some(Value::Array(docs)) if !docs.is_empty() => docs,
        _ => {
            return Err(format!(
                "Sorry, document requirements not available for {cert_type}."
            ));
        }
    };

    let mut lines = vec![format!("Documents Required for {}:", title_case(&cert_type))];
    lines.extend(docs.iter().map(|doc| format!("• {}", text(doc))));
    Ok(lines.join("\n"))
}

fn cost_info(catalog: &CertificateCatalog, cert_type: Option<&str>) -> Reply {
    let (cert_type, info) = find(
        catalog,
        cert_type,
        "For which certificate would you like fee information?",
        |c| format!("Sorry, I don't have fee details for {c}."),
    )?;

    let mut fees = first_present(info, &["cost", "fee_structure", "fees"])
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));

    if is_passport(&cert_type)
        && let Some(tatkal_fee) = info
            .get("tatkal_passport_procedure")
            .and_then(|t| t.get("processing_fee"))
            .filter(|fee| truthy(fee))
        && let Value::Object(map) = &mut fees
    {
        map.insert("tatkal".to_string(), tatkal_fee.clone());
    }

    if !truthy(&fees) {
        return Err(format!("Fee information not available for {cert_type}."));
    }

    let mut lines = vec![
        format!("💰 Fees for {}", display_name(info, &cert_type)),
        String::new(),
    ];
    match &fees {
        Value::Object(map) => nested_bullets(map, "💳", &mut lines),
        other => lines.push(format!("• Standard Fee*: {}", text(other))),
    }
    Ok(lines.join("\n"))
}

fn passport_tatkal_info(catalog: &CertificateCatalog) -> Reply {
    let tatkal = entry(catalog, &["passport", "passports"])
        .and_then(|info| info.get("tatkal_passport_procedure"))
        .ok_or_else(|| "Sorry, I don't have Tatkal passport information available.".to_string())?;

    let mut lines = vec![
        "🚨 *Tatkal Passport Procedure*".to_string(),
        String::new(),
        format!(
            "✅ *Eligibility:* {}",
            str_or(tatkal, "eligibility", "Not specified")
        ),
        String::new(),
        "📄 *Additional Documents Needed:*".to_string(),
    ];
    if let Some(Value::Array(docs)) = tatkal.get("additional_documents_needed") {
        lines.extend(docs.iter().map(|doc| format!("• {}", text(doc))));
    }
    lines.push(String::new());
    lines.push(format!(
        "💰 *Processing Fee:* {}",
        str_or(tatkal, "processing_fee", "Not specified")
    ));
    lines.push(format!(
        "⏱️ *Processing Time:* {}",
        str_or(tatkal, "processing_time", "Not specified")
    ));
    Ok(lines.join("\n"))
}

fn license_types(catalog: &CertificateCatalog) -> Reply {
    let Some(Value::Object(types)) = entry(catalog, &["driving license", "driving_license"])
        .and_then(|info| info.get("types_of_license"))
    else {
        return Err("Sorry, I don't have driving license type information available.".to_string());
    };
    let mut lines = vec!["🚗 Types of Driving Licenses".to_string(), String::new()];
    bullets(types, &mut lines);
    Ok(lines.join("\n"))
}

fn duplicate_info(catalog: &CertificateCatalog, cert_type: Option<&str>) -> Reply {
    let (cert_type, info) = find(
        catalog,
        cert_type,
        "For which certificate do you need duplicate information?",
        |c| format!("Sorry, I don't have duplicate certificate details for {c}."),
    )?;

    let Some(dup) = first_present(info, &["duplicate_certificate", "lost_or_damaged_passport"])
        .filter(|dup| truthy(dup))
    else {
        return Err(format!("Duplicate process not available for {cert_type}."));
    };

    let mut lines = vec![
        format!(
            "🔄 Process for Duplicate {}",
            display_name(info, &cert_type)
        ),
        String::new(),
    ];
    if let Some(Value::Array(steps)) = dup.get("how_to_get") {
        lines.push("📝 Steps to Obtain Duplicate:".to_string());
        numbered(steps, &mut lines);
    } else if let Some(Value::Array(steps)) = dup.get("how_to_replace") {
        lines.push("📝 Replacement Process:".to_string());
        numbered(steps, &mut lines);
    }
    if let Some(time) = dup.get("processing_time") {
        lines.push(String::new());
        lines.push(format!("⏱️ Processing Time: {}", text(time)));
    }
    if let Some(cost) = dup.get("cost") {
        lines.push(String::new());
        lines.push(format!("💰 Cost: ₹{}", text(cost)));
    }
    Ok(lines.join("\n"))
}

fn issuing_authority(catalog: &CertificateCatalog, cert_type: Option<&str>) -> Reply {
    let (cert_type, info) = find(
        catalog,
        cert_type,
        "Please specify which certificate's issuing authority you need.",
        |c| format!("Sorry, I don't have issuing authority information for {c}."),
    )?;

    let authority = first_truthy(info, &["issuing_authority", "issued_by", "issuing_office"])
        .ok_or_else(|| format!("Issuing authority information not available for {cert_type}."))?;

    let lines = [
        format!(
            "🏛️ Issuing Authority for {}",
            display_name(info, &cert_type)
        ),
        String::new(),
        text(authority),
    ];
    Ok(lines.join("\n"))
}

fn check_eligibility(catalog: &CertificateCatalog, cert_type: Option<&str>) -> Reply {
    let unknown = |c: &str| format!("Sorry, I don't have eligibility criteria for {c}.");
    let (cert_type, info) = find(
        catalog,
        cert_type,
        "For which certificate would you like to check eligibility?",
        unknown,
    )?;
    let eligibility = info.get("eligibility").ok_or_else(|| unknown(&cert_type))?;

    let mut lines = vec![
        format!("✅ Eligibility for {}", display_name(info, &cert_type)),
        String::new(),
    ];

    if is_driving_license(&cert_type) {
        lines.push("🛵 *Learner's License:*".to_string());
        let learner = eligibility.get("learner_license");
        if let Some(Value::Object(ages)) = learner.and_then(|l| l.get("age_requirement")) {
            for (vehicle, requirement) in ages {
                lines.push(format!("• *{}*: {}", humanize_key(vehicle), text(requirement)));
            }
        }
        if let Some(other) = learner.and_then(|l| l.get("other_requirements")) {
            lines.push(String::new());
            lines.push("📌 Other Requirements:".to_string());
            lines.push(text(other));
        }
        lines.push(String::new());
        lines.push("🚘 Permanent License:".to_string());
        if let Some(requirements) = eligibility
            .get("permanent_license")
            .and_then(|p| p.get("requirements"))
        {
            lines.push(text(requirements));
        }
    } else {
        match eligibility {
            Value::Object(map) => nested_bullets(map, "📌", &mut lines),
            other => lines.push(text(other)),
        }
    }
    Ok(lines.join("\n"))
}

fn passport_types(catalog: &CertificateCatalog) -> Reply {
    let Some(Value::Object(types)) =
        entry(catalog, &["passport", "passports"]).and_then(|info| info.get("types_of_passport"))
    else {
        return Err("Sorry, I don't have passport type information available.".to_string());
    };
    let mut lines = vec!["🛂 Types of Passports".to_string(), String::new()];
    bullets(types, &mut lines);
    Ok(lines.join("\n"))
}

fn online_application_info(catalog: &CertificateCatalog, cert_type: Option<&str>) -> Reply {
    let unavailable = |c: &str| format!("Sorry, online application is not available for {c}.");
    let (cert_type, info) = find(
        catalog,
        cert_type,
        "For which certificate would you like online application information?",
        unavailable,
    )?;

    let process_place = info
        .get("application_process")
        .and_then(Value::as_object)
        .and_then(|process| process.get("where_to_apply"));
    let apply_online = info
        .get("online_services")
        .and_then(|services| services.get("apply_online"));

    let portal = if let Some(portal) = info.get("online_portal") {
        Some(portal)
    } else if let Some(place) = process_place {
        Some(place).filter(|place| text(place).contains("http"))
    } else {
        apply_online
    };
    let portal = portal
        .filter(|portal| truthy(portal))
        .ok_or_else(|| unavailable(&cert_type))?;

    let lines = [
        format!(
            "🌐 Online Application for {}",
            display_name(info, &cert_type)
        ),
        String::new(),
        format!("🔗 Portal: {}", text(portal)),
        String::new(),
        "📋 Application Steps:".to_string(),
        "1. Visit the portal".to_string(),
        "2. Create an account".to_string(),
        "3. Fill the application form".to_string(),
        "4. Upload required documents".to_string(),
        "5. Pay the fees".to_string(),
        "6. Track your application".to_string(),
    ];
    Ok(lines.join("\n"))
}

fn processing_time(catalog: &CertificateCatalog, cert_type: Option<&str>) -> Reply {
    let (cert_type, info) = find(
        catalog,
        cert_type,
        "For which certificate would you like processing time information?",
        |c| format!("Sorry, I don't have processing time details for {c}."),
    )?;

    let processing = if let Some(time) = info.get("processing_time") {
        Some(time.clone())
    } else if let Some(Value::Object(process)) = info.get("application_process") {
        process.get("processing_time").cloned()
    } else if is_passport(&cert_type)
        && let Some(tatkal) = info.get("tatkal_passport_procedure")
    {
        let mut times = Map::new();
        times.insert(
            "normal".to_string(),
            Value::String(str_or(info, "processing_time", "Not specified")),
        );
        times.insert(
            "tatkal".to_string(),
            Value::String(str_or(tatkal, "processing_time", "1-3 days")),
        );
        Some(Value::Object(times))
    } else {
        None
    };
    let Some(processing) = processing.filter(truthy) else {
        return Err(format!(
            "Processing time information not available for {cert_type}."
        ));
    };

    let mut lines = vec![
        format!(
            "⏱️ Processing Time for {}",
            display_name(info, &cert_type)
        ),
        String::new(),
    ];
    match &processing {
        Value::Object(map) => bullets(map, &mut lines),
        Value::Array(items) => lines.extend(items.iter().map(|item| format!("• {}", text(item)))),
        other => lines.push(format!("• Standard Processing: {}", text(other))),
    }

    for (section, label) in [
        ("duplicate_card", "Duplicate Processing"),
        ("correction_or_update", "Correction Processing"),
    ] {
        if let Some(time) = info.get(section).and_then(|s| s.get("processing_time")) {
            lines.push(String::new());
            lines.push(format!("• {label}: {}", text(time)));
        }
    }
    Ok(lines.join("\n"))
}

fn ration_card_types(catalog: &CertificateCatalog) -> Reply {
    let Some(Value::Object(types)) = entry(catalog, &["ration card", "ration_card"])
        .and_then(|info| info.get("types_of_ration_cards"))
    else {
        return Err("Sorry, ration card type information isn't available.".to_string());
    };

    let mut lines = vec![
        "🛒 Types of Ration Cards".to_string(),
        String::new(),
        "The Public Distribution System issues these card types:".to_string(),
        String::new(),
    ];
    for (card_type, description) in types {
        lines.push(format!("• {}: {}", card_type.to_uppercase(), text(description)));
        lines.push(String::new());
    }
    Ok(lines.join("\n"))
}

fn validity_info(catalog: &CertificateCatalog, cert_type: Option<&str>) -> Reply {
    let (cert_type, info) = find(
        catalog,
        cert_type,
        "For which certificate would you like validity information?",
        |c| format!("Sorry, I don't have validity information for {c}."),
    )?;

    let validity = first_truthy(info, &["validity", "expiry"])
        .map(text)
        .unwrap_or_else(|| "Typically valid until cancelled or updated".to_string());

    let lines = [
        format!(
            "📅 Validity Information for {}",
            display_name(info, &cert_type)
        ),
        String::new(),
        validity,
    ];
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CertificateCatalog {
        CertificateCatalog::from_json_str(include_str!("../data/certificate_data.json"))
            .expect("sample certificate data")
    }

    fn reply(action: ActionName, cert_type: Option<&str>) -> String {
        let outcome = run_action(action, &catalog(), cert_type);
        assert!(outcome.events.is_empty());
        assert_eq!(outcome.responses.len(), 1);
        outcome.responses[0].clone()
    }

    #[test]
    fn names_round_trip() {
        for action in ActionName::ALL {
            assert_eq!(ActionName::from_name(action.as_str()), Some(action));
        }
        assert_eq!(ActionName::from_name("action_listen"), None);
    }

    #[test]
    fn reset_clears_the_slot() {
        let outcome = run_action(ActionName::ResetCertificateType, &catalog(), Some("passport"));
        assert!(outcome.responses.is_empty());
        assert_eq!(
            serde_json::to_value(&outcome.events).unwrap(),
            serde_json::json!([{ "event": "slot", "name": "certificate_type", "value": null }])
        );
    }

    #[test]
    fn missing_slot_prompts_for_certificate() {
        assert_eq!(
            reply(ActionName::CertificateInfo, None),
            "Please specify which certificate you need information about."
        );
        assert_eq!(
            reply(ActionName::ValidityInfo, Some("")),
            "For which certificate would you like validity information?"
        );
    }

    #[test]
    fn unknown_certificate_apologises() {
        assert_eq!(
            reply(ActionName::CertificateInfo, Some("Voter ID")),
            "Sorry, I don't have information about Voter ID certificates."
        );
        assert_eq!(
            reply(ActionName::OnlineApplicationInfo, Some("Voter ID")),
            "Sorry, online application is not available for Voter ID."
        );
    }

    #[test]
    fn certificate_info_lists_passport_types() {
        let text = reply(ActionName::CertificateInfo, Some("Passport"));
        assert!(text.starts_with("📌 *Passport*"));
        assert!(text.contains("🏛️ Issuing Authority:\nMinistry of External Affairs (Passport Seva)\n"));
        assert!(text.contains("• Ordinary Passport: Blue cover, issued for personal travel"));
    }

    #[test]
    fn certificate_info_falls_back_to_purpose() {
        let text = reply(ActionName::CertificateInfo, Some("ration card"));
        assert!(text.contains("Entitles households to subsidised food grains"));
        assert!(text.contains("🏛️ Issuing Authority:\nNot specified"));
    }

    #[test]
    fn application_process_for_learner_license() {
        let text = reply(ActionName::ApplicationProcess, Some("Driving License"));
        assert!(text.starts_with("📋 Application Process for Driving License"));
        assert!(text.contains("1. Fill Form 2 on the Sarathi portal\n"));
        assert!(text.contains("• Learner: Same day after passing the test"));
        assert!(text.contains("📍 Where to Apply:\nhttps://sarathi.parivahan.gov.in"));
    }

    #[test]
    fn application_process_from_plain_step_list() {
        let text = reply(ActionName::ApplicationProcess, Some("birth certificate"));
        assert!(text.contains("3. Collect the certificate from the municipal office"));
        assert!(!text.contains("Where to Apply"));
        assert_eq!(
            reply(ActionName::ApplicationProcess, Some("passport")),
            "Sorry, application process not available for passport."
        );
    }

    #[test]
    fn documents_are_bulleted() {
        assert_eq!(
            reply(ActionName::DocumentsList, Some("income certificate")),
            "Documents Required for Income Certificate:\n• Identity proof\n• Salary slips or income affidavit"
        );
    }

    #[test]
    fn passport_fees_include_tatkal() {
        let text = reply(ActionName::CostInfo, Some("passport"));
        assert_eq!(
            text,
            "💰 Fees for Passport\n\n• Normal 36 Pages: ₹1,500\n• Normal 60 Pages: ₹2,000\n• Tatkal: ₹2,000 in addition to the normal fee"
        );
    }

    #[test]
    fn nested_and_flat_fee_structures() {
        let text = reply(ActionName::CostInfo, Some("driving license"));
        assert!(text.contains("💳 International Permit:\n  • Application: ₹1,000\n  • Renewal: ₹500"));
        let text = reply(ActionName::CostInfo, Some("birth certificate"));
        assert!(text.ends_with("• Standard Fee*: Free within 21 days of birth"));
        assert_eq!(
            reply(ActionName::CostInfo, Some("income certificate")),
            "Fee information not available for income certificate."
        );
    }

    #[test]
    fn tatkal_procedure_summary() {
        let text = reply(ActionName::PassportTatkalInfo, None);
        assert!(text.contains("✅ *Eligibility:* Any applicant with an urgent need to travel"));
        assert!(text.contains("• Self-declaration on plain paper"));
        assert!(text.ends_with("⏱️ *Processing Time:* 1-3 working days"));
    }

    #[test]
    fn type_listings() {
        assert!(reply(ActionName::LicenseTypes, None).contains("• Mcwg: Motorcycle with gear"));
        assert!(reply(ActionName::PassportTypes, None).contains("• Diplomatic Passport: Maroon cover"));
        let ration = reply(ActionName::RationCardTypes, None);
        assert!(ration.contains("• AAY: Antyodaya Anna Yojana, the poorest households"));
    }

    #[test]
    fn type_listings_without_data() {
        let empty = CertificateCatalog::default();
        assert_eq!(
            run_action(ActionName::PassportTypes, &empty, None).responses,
            vec!["Sorry, I don't have passport type information available.".to_string()]
        );
    }

    #[test]
    fn duplicate_steps_and_cost() {
        let text = reply(ActionName::DuplicateInfo, Some("driving_license"));
        assert!(text.contains("📝 Steps to Obtain Duplicate:\n1. File an FIR if the license was stolen"));
        assert!(text.ends_with("💰 Cost: ₹200"));
        let text = reply(ActionName::DuplicateInfo, Some("passport"));
        assert!(text.contains("📝 Replacement Process:"));
        assert_eq!(
            reply(ActionName::DuplicateInfo, Some("income certificate")),
            "Duplicate process not available for income certificate."
        );
    }

    #[test]
    fn issuing_authority_alternatives() {
        assert!(reply(ActionName::IssuingAuthority, Some("ration card"))
            .ends_with("State Food and Civil Supplies Department"));
        assert!(reply(ActionName::IssuingAuthority, Some("birth certificate"))
            .ends_with("Registrar of Births and Deaths, Municipal Corporation"));
    }

    #[test]
    fn driving_license_eligibility_layout() {
        let text = reply(ActionName::CheckEligibility, Some("driving license"));
        assert!(text.contains("🛵 *Learner's License:*\n• *Two Wheeler Without Gear*: 16 years with guardian consent"));
        assert!(text.contains("📌 Other Requirements:\nMust know traffic rules and road signs"));
        assert!(text.ends_with("🚘 Permanent License:\nHold a learner's license for at least 30 days"));
    }

    #[test]
    fn generic_eligibility_layout() {
        let text = reply(ActionName::CheckEligibility, Some("passport"));
        assert!(text.contains("• Citizenship: Indian citizen"));
        assert!(text.contains("📌 Minors:\n  • Consent: Both parents must sign Annexure D"));
        assert_eq!(
            reply(ActionName::CheckEligibility, Some("ration card")),
            "Sorry, I don't have eligibility criteria for ration card."
        );
    }

    #[test]
    fn online_portal_sources() {
        assert!(reply(ActionName::OnlineApplicationInfo, Some("passport"))
            .contains("🔗 Portal: https://www.passportindia.gov.in"));
        assert!(reply(ActionName::OnlineApplicationInfo, Some("ration card"))
            .contains("🔗 Portal: https://nfsa.gov.in"));
        assert!(reply(ActionName::OnlineApplicationInfo, Some("birth certificate"))
            .contains("🔗 Portal: https://crsorgi.gov.in"));
        assert_eq!(
            reply(ActionName::OnlineApplicationInfo, Some("income certificate")),
            "Sorry, online application is not available for income certificate."
        );
    }

    #[test]
    fn processing_time_shapes() {
        assert!(reply(ActionName::ProcessingTime, Some("passport"))
            .ends_with("• Standard Processing: 30-45 days"));
        assert!(reply(ActionName::ProcessingTime, Some("birth certificate"))
            .contains("• 7 days for births registered on time\n• Up to 30 days for delayed registration"));
        let ration = reply(ActionName::ProcessingTime, Some("ration card"));
        assert!(ration.contains("• Standard Processing: 30 days"));
        assert!(ration.contains("• Duplicate Processing: 15 days"));
        assert!(ration.ends_with("• Correction Processing: 7-15 days"));
        assert_eq!(
            reply(ActionName::ProcessingTime, Some("income certificate")),
            "Processing time information not available for income certificate."
        );
    }

    #[test]
    fn validity_uses_expiry_or_default() {
        assert!(reply(ActionName::ValidityInfo, Some("income certificate"))
            .ends_with("Valid for one financial year"));
        assert!(reply(ActionName::ValidityInfo, Some("ration card"))
            .ends_with("Typically valid until cancelled or updated"));
    }
}
