//! Word lists the extraction rules and the clustering share

/// Base forms of verbs that introduce a workflow
pub const ACTION_VERBS: &[&str] = &[
    "add", "analyze", "approve", "archive", "assign", "book", "calculate", "cancel", "configure",
    "create", "delete", "deploy", "edit", "export", "extract", "fulfill", "generate", "handle",
    "import", "invoice", "load", "manage", "migrate", "modify", "monitor", "notify", "onboard",
    "process", "publish", "refund", "register", "reject", "remove", "report", "review",
    "schedule", "search", "send", "ship", "submit", "sync", "track", "transform", "update",
    "validate", "verify", "view",
];

/// Verbs folded onto one canonical verb when comparing workflows
const VERB_SYNONYMS: &[(&str, &str)] = &[
    ("modify", "update"),
    ("edit", "update"),
    ("change", "update"),
    ("alter", "update"),
    ("add", "create"),
    ("make", "create"),
    ("remove", "delete"),
    ("erase", "delete"),
    ("show", "view"),
    ("display", "view"),
    ("list", "view"),
];

/// Nouns naming an action, mapped to the action's verb
const NOMINALIZATIONS: &[(&str, &str)] = &[
    ("creation", "create"),
    ("modification", "modify"),
    ("deletion", "delete"),
    ("removal", "remove"),
    ("processing", "process"),
    ("cancellation", "cancel"),
    ("tracking", "track"),
    ("management", "manage"),
    ("validation", "validate"),
    ("verification", "verify"),
    ("approval", "approve"),
    ("submission", "submit"),
    ("registration", "register"),
    ("generation", "generate"),
    ("scheduling", "schedule"),
    ("notification", "notify"),
    ("calculation", "calculate"),
    ("analysis", "analyze"),
    ("fulfillment", "fulfill"),
    ("publishing", "publish"),
    ("reporting", "report"),
    ("monitoring", "monitor"),
    ("onboarding", "onboard"),
    ("invoicing", "invoice"),
];

/// Agent-noun suffixes for single-purpose agents
const AGENTIVE: &[(&str, &str)] = &[
    ("analyze", "analyst"),
    ("approve", "approver"),
    ("calculate", "calculator"),
    ("create", "creator"),
    ("export", "exporter"),
    ("extract", "extractor"),
    ("generate", "generator"),
    ("import", "importer"),
    ("manage", "manager"),
    ("monitor", "monitor"),
    ("notify", "notifier"),
    ("process", "processor"),
    ("publish", "publisher"),
    ("report", "reporter"),
    ("review", "reviewer"),
    ("schedule", "scheduler"),
    ("track", "tracker"),
    ("transform", "transformer"),
    ("update", "updater"),
    ("validate", "validator"),
    ("verify", "verifier"),
];

/// Function words and generic nouns that never name an entity or object
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "before",
    "between", "both", "but", "by", "can", "could", "description", "do", "each", "every",
    "feature", "features", "for", "from", "has", "have", "he", "how", "if", "in", "into",
    "integration", "integrations", "introduction", "is", "it", "its", "may", "must", "no", "not",
    "note", "notes", "of", "on", "or", "other", "our", "overview", "requirement", "requirements",
    "she", "should", "so", "such", "summary", "system", "that", "the", "their", "them", "then",
    "there", "these", "they", "this", "those", "through", "to", "using", "via", "was", "we",
    "were", "what", "when", "where", "which", "while", "who", "will", "with", "within",
    "without", "would", "you", "your",
];

/// Modifiers skipped between a verb and its object
pub const MODIFIERS: &[&str] = &[
    "a", "all", "an", "any", "current", "each", "every", "existing", "its", "multiple", "new",
    "our", "some", "the", "their", "your",
];

/// Stakeholder role words (singular) and the group label they report as
pub const ROLES: &[(&str, &str)] = &[
    ("admin", "Administrators"),
    ("administrator", "Administrators"),
    ("analyst", "Analysts"),
    ("client", "Clients"),
    ("customer", "Customers"),
    ("developer", "Developers"),
    ("editor", "Editors"),
    ("employee", "Employees"),
    ("guest", "Guests"),
    ("manager", "Managers"),
    ("member", "Members"),
    ("operator", "Operators"),
    ("owner", "Owners"),
    ("partner", "Partners"),
    ("reviewer", "Reviewers"),
    ("staff", "Staff"),
    ("supplier", "Suppliers"),
    ("support", "Support Team"),
    ("user", "Users"),
    ("vendor", "Vendors"),
];

/// Well-known third-party services
pub const KNOWN_INTEGRATIONS: &[&str] = &[
    "AWS", "Azure", "DHL", "Discord", "Elasticsearch", "FedEx", "Firebase", "GitHub", "GitLab",
    "Google", "HubSpot", "Jira", "Kafka", "Mailchimp", "MongoDB", "MySQL", "Notion", "OpenAI",
    "PayPal", "Postgres", "PostgreSQL", "QuickBooks", "RabbitMQ", "Redis", "S3", "Salesforce",
    "SendGrid", "Shopify", "Slack", "Stripe", "Supabase", "Twilio", "UPS", "WhatsApp", "Xero",
    "Zapier",
];

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

fn lookup(table: &[(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn known_verb(candidate: &str) -> Option<&'static str> {
    ACTION_VERBS.iter().copied().find(|v| *v == candidate)
}

/// Base form of an inflected action verb (`creates`, `processed`, `shipping`).
pub fn verb_base(word: &str) -> Option<&'static str> {
    let word = word.to_lowercase();
    if let Some(verb) = known_verb(&word) {
        return Some(verb);
    }

    let mut candidates = Vec::new();
    if let Some(stem) = word.strip_suffix("ing") {
        candidates.push(stem.to_string());
        candidates.push(format!("{}e", stem));
        if let Some(undoubled) = undouble(stem) {
            candidates.push(undoubled);
        }
    }
    if let Some(stem) = word.strip_suffix("ed") {
        candidates.push(stem.to_string());
        candidates.push(format!("{}e", stem));
        if let Some(undoubled) = undouble(stem) {
            candidates.push(undoubled);
        }
        if let Some(y_stem) = stem.strip_suffix('i') {
            candidates.push(format!("{}y", y_stem));
        }
    }
    if let Some(stem) = word.strip_suffix("ies") {
        candidates.push(format!("{}y", stem));
    }
    if let Some(stem) = word.strip_suffix("es") {
        candidates.push(stem.to_string());
    }
    if let Some(stem) = word.strip_suffix('s') {
        candidates.push(stem.to_string());
    }

    candidates.iter().find_map(|c| known_verb(c))
}

/// `shipp` -> `ship`
fn undouble(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    if n >= 2 && bytes[n - 1] == bytes[n - 2] {
        Some(stem[..n - 1].to_string())
    } else {
        None
    }
}

/// Verb named by an action noun (`creation` -> `create`)
pub fn nominalized_verb(word: &str) -> Option<&'static str> {
    lookup(NOMINALIZATIONS, &word.to_lowercase())
}

/// Fold synonyms so equivalent workflows compare equal
pub fn canonical_verb(verb: &str) -> String {
    lookup(VERB_SYNONYMS, verb).unwrap_or(verb).to_string()
}

pub fn agentive(verb: &str) -> &'static str {
    lookup(AGENTIVE, verb).unwrap_or("handler")
}

pub fn role_label(singular: &str) -> Option<&'static str> {
    lookup(ROLES, singular)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_base_inflections() {
        assert_eq!(verb_base("creates"), Some("create"));
        assert_eq!(verb_base("Created"), Some("create"));
        assert_eq!(verb_base("creating"), Some("create"));
        assert_eq!(verb_base("processes"), Some("process"));
        assert_eq!(verb_base("processing"), Some("process"));
        assert_eq!(verb_base("shipping"), Some("ship"));
        assert_eq!(verb_base("notifies"), Some("notify"));
        assert_eq!(verb_base("verified"), Some("verify"));
        assert_eq!(verb_base("order"), None);
    }

    #[test]
    fn test_synonyms_and_nominalizations() {
        assert_eq!(canonical_verb("modify"), "update");
        assert_eq!(canonical_verb("create"), "create");
        assert_eq!(nominalized_verb("Creation"), Some("create"));
        assert_eq!(agentive("process"), "processor");
        assert_eq!(agentive("cancel"), "handler");
    }
}
