//! Localized notification content. Pure string composition; all I/O lives in
//! the dispatcher and gateways.

use std::fmt::Write as _;

use crate::alerts::domain::{EmergencyCenter, Language, NeedType, Severity};
use crate::alerts::proximity::Ranked;

/// Fixed per-language template fragments. One bundle per supported language;
/// unsupported codes never reach here because `Language::parse` falls back to
/// English.
struct Bundle {
    alert_title: &'static str,
    severity_line: &'static str,
    distance_line: &'static str,
    shelters_heading: &'static str,
    default_description: &'static str,
    safety: &'static str,
    confirmation_subject: &'static str,
    confirmation_body: &'static str,
    severity_words: [&'static str; 3],
}

const EN: Bundle = Bundle {
    alert_title: "Flood Alert",
    severity_line: "A {severity} severity flood has been reported near {location}.",
    distance_line: "The affected area is about {distance} km from your registered location.",
    shelters_heading: "Nearest shelters",
    default_description: "Please stay alert and follow guidance from local authorities.",
    safety: "Move to higher ground immediately. Do not walk or drive through flood waters. \
             Keep your emergency contacts within reach.",
    confirmation_subject: "Flood alert subscription confirmed",
    confirmation_body: "You will now receive flood alerts for {location}.",
    severity_words: ["low", "medium", "high"],
};

const YO: Bundle = Bundle {
    alert_title: "Ìkìlọ̀ Omíyalé",
    severity_line: "A ti gbọ́ ìròyìn omíyalé oní ìwọ̀n {severity} nítòsí {location}.",
    distance_line: "Agbègbè tí ó kan náà tó bí kìlómítà {distance} sí ibi tí o forúkọ sílẹ̀.",
    shelters_heading: "Àwọn ibùdó ààbò tó súnmọ́ ọ jùlọ",
    default_description: "Jọ̀wọ́ múra sílẹ̀ kí o sì tẹ̀lé ìtọ́sọ́nà àwọn aláṣẹ àdúgbò.",
    safety: "Lọ sí ibi gíga lẹ́sẹ̀kẹsẹ̀. Má ṣe rìn tàbí wa ọkọ̀ gba inú omi àkúnya. \
             Fi àwọn nọ́mbà pàjáwìrì sí àrọ́wọ́tó.",
    confirmation_subject: "A ti fọwọ́ sí ìforúkọsílẹ̀ ìkìlọ̀ omíyalé rẹ",
    confirmation_body: "Wàá máa gba ìkìlọ̀ omíyalé fún {location} láti ìsinsìnyí lọ.",
    severity_words: ["kékeré", "àárín", "gíga"],
};

const HA: Bundle = Bundle {
    alert_title: "Gargadin Ambaliya",
    severity_line: "An samu rahoton ambaliyar ruwa mai matsayin {severity} kusa da {location}.",
    distance_line: "Yankin da abin ya shafa yana da kusan kilomita {distance} daga wurin da ka yi rajista.",
    shelters_heading: "Mafaka mafi kusa",
    default_description: "Da fatan za ku zauna cikin shiri ku bi jagorancin hukumomin yankinku.",
    safety: "Ku matsa zuwa wuri mai tudu nan take. Kada ku yi tafiya ko tuki cikin ruwan ambaliya. \
             Ku ajiye lambobin gaggawa kusa da ku.",
    confirmation_subject: "An tabbatar da rajistar gargadin ambaliya",
    confirmation_body: "Daga yanzu za ku rika samun gargadin ambaliya na {location}.",
    severity_words: ["karami", "matsakaici", "babba"],
};

const IG: Bundle = Bundle {
    alert_title: "Ọkwa Idei Mmiri",
    severity_line: "Akọpụtala idei mmiri nke ogo {severity} nso {location}.",
    distance_line: "Mpaghara ahụ metụtara dị ihe dịka kilomita {distance} site n'ebe i debanyere aha.",
    shelters_heading: "Ebe mgbaba kacha nso",
    default_description: "Biko nọrọ na njikere ma gbasoo ntuziaka ndị ọchịchị obodo.",
    safety: "Gaa ebe dị elu ozugbo. Agafela mmiri idei n'ụkwụ ma ọ bụ n'ụgbọala. \
             Debe nọmba enyemaka gị nso.",
    confirmation_subject: "Akwadola ndebanye aha ọkwa idei mmiri gị",
    confirmation_body: "Ị ga na-enweta ọkwa idei mmiri maka {location} site ugbu a.",
    severity_words: ["obere", "etiti", "oke"],
};

fn bundle(language: Language) -> &'static Bundle {
    match language {
        Language::En => &EN,
        Language::Yo => &YO,
        Language::Ha => &HA,
        Language::Ig => &IG,
    }
}

fn severity_word(language: Language, severity: Severity) -> &'static str {
    let words = bundle(language).severity_words;
    match severity {
        Severity::Low => words[0],
        Severity::Medium => words[1],
        Severity::High => words[2],
    }
}

fn fill(template: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in pairs {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

/// A fully rendered message ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub html: String,
}

/// Per-recipient context for a flood event notification.
#[derive(Debug, Clone)]
pub struct FloodContext<'a> {
    pub severity: Severity,
    pub location: &'a str,
    pub description: Option<&'a str>,
    pub distance_km: f64,
    pub shelters: &'a [Ranked<EmergencyCenter>],
}

pub fn flood_notification(language: Language, ctx: &FloodContext<'_>) -> RenderedMessage {
    let bundle = bundle(language);
    let severity = severity_word(language, ctx.severity);
    let subject = format!("{}: {} - {}", bundle.alert_title, severity, ctx.location);

    let mut html = String::new();
    let _ = writeln!(html, "<h2>{}</h2>", bundle.alert_title);
    let _ = writeln!(
        html,
        "<p>{}</p>",
        fill(
            bundle.severity_line,
            &[("severity", severity), ("location", ctx.location)]
        )
    );
    let _ = writeln!(
        html,
        "<p>{}</p>",
        ctx.description.unwrap_or(bundle.default_description)
    );
    let _ = writeln!(
        html,
        "<p>{}</p>",
        fill(
            bundle.distance_line,
            &[("distance", &format!("{:.1}", ctx.distance_km))]
        )
    );
    if !ctx.shelters.is_empty() {
        let _ = writeln!(html, "<h3>{}</h3>", bundle.shelters_heading);
        let _ = writeln!(html, "<ul>");
        for shelter in ctx.shelters {
            let _ = writeln!(
                html,
                "<li>{} ({}) - {:.1} km</li>",
                shelter.item.name,
                shelter.item.kind.label(),
                shelter.distance_km
            );
        }
        let _ = writeln!(html, "</ul>");
    }
    let _ = writeln!(html, "<p>{}</p>", bundle.safety);

    RenderedMessage { subject, html }
}

/// Context for notifying an emergency center about a citizen report. Centers
/// are institutional recipients, so this always renders in English.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub reporter_name: &'a str,
    pub need: NeedType,
    pub comments: &'a str,
    pub location: &'a str,
    pub distance_km: f64,
}

pub fn report_notification(ctx: &ReportContext<'_>) -> RenderedMessage {
    let subject = format!(
        "Emergency report: {} assistance needed near {}",
        ctx.need.label(),
        ctx.location
    );

    let mut html = String::new();
    let _ = writeln!(html, "<h2>Emergency Report</h2>");
    let _ = writeln!(
        html,
        "<p>{} has reported needing <strong>{}</strong> assistance at {}.</p>",
        ctx.reporter_name,
        ctx.need.label(),
        ctx.location
    );
    if !ctx.comments.trim().is_empty() {
        let _ = writeln!(html, "<p>Details: {}</p>", ctx.comments);
    }
    let _ = writeln!(
        html,
        "<p>The reported position is about {:.1} km from your center.</p>",
        ctx.distance_km
    );

    RenderedMessage { subject, html }
}

/// Localized confirmation sent best-effort when a new subscription carries an
/// email address.
pub fn confirmation_message(language: Language, location: &str) -> RenderedMessage {
    let bundle = bundle(language);
    let body = fill(bundle.confirmation_body, &[("location", location)]);
    RenderedMessage {
        subject: bundle.confirmation_subject.to_string(),
        html: format!("<p>{body}</p>"),
    }
}
