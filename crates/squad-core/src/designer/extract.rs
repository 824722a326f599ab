//! Rule-based extraction of domain concepts from documentation text

use once_cell::sync::Lazy;
use regex::Regex;

use super::lexicon::{
    KNOWN_INTEGRATIONS, MODIFIERS, is_stop_word, nominalized_verb, role_label, verb_base,
};
use crate::naming::{singularize, to_kebab_case};

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9]*").expect("valid word regex"));

static CLAUSE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.,;:!?()\[\]\n]|\s[-\u{2013}\u{2014}]\s").expect("valid clause regex"));

static NAMED_INTEGRATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z][A-Za-z0-9]*)\s+(APIs?|SDK|[Dd]atabase|DB|[Ww]ebhooks?|[Gg]ateway)\b")
        .expect("valid integration regex")
});

/// Longest object phrase a verb may take
const MAX_OBJECT_WORDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub lower: String,
}

impl Token {
    fn is_capitalized(&self) -> bool {
        let mut chars = self.text.chars();
        let first_upper = chars.next().is_some_and(|c| c.is_ascii_uppercase());
        first_upper && chars.any(|c| c.is_ascii_lowercase())
    }
}

/// Text split into clauses of word tokens
#[derive(Debug, Clone)]
pub struct Document {
    pub clauses: Vec<Clause>,
}

#[derive(Debug, Clone)]
pub struct Clause {
    pub text: String,
    pub tokens: Vec<Token>,
}

impl Document {
    pub fn parse(content: &str) -> Self {
        let clauses = CLAUSE_BREAK
            .split(content)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|text| Clause {
                text: text.to_string(),
                tokens: WORD
                    .find_iter(text)
                    .map(|m| Token {
                        text: m.as_str().to_string(),
                        lower: m.as_str().to_lowercase(),
                    })
                    .collect(),
            })
            .collect();
        Self { clauses }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    Entity(String),
    Workflow(String),
    Integration(String),
    Stakeholder(String),
}

pub trait ExtractionRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, doc: &Document) -> Vec<Finding>;
}

fn is_integration_name(word: &str) -> bool {
    KNOWN_INTEGRATIONS.iter().any(|k| k.eq_ignore_ascii_case(word))
}

/// Capitalized, noun-like words
pub struct EntityRule;

impl ExtractionRule for EntityRule {
    fn name(&self) -> &'static str {
        "entities"
    }

    fn extract(&self, doc: &Document) -> Vec<Finding> {
        let mut findings = Vec::new();
        for token in doc.clauses.iter().flat_map(|c| &c.tokens) {
            if token.text.len() < 3 || !token.is_capitalized() {
                continue;
            }
            if is_stop_word(&token.lower)
                || verb_base(&token.lower).is_some()
                || nominalized_verb(&token.lower).is_some()
                || is_integration_name(&token.text)
            {
                continue;
            }
            // Plural role words name stakeholder groups rather than entities.
            let singular = singularize(&token.lower);
            if singular != token.lower && role_label(&singular).is_some() {
                continue;
            }
            findings.push(Finding::Entity(token.text.clone()));
        }
        findings
    }
}

/// `<verb> <object>` phrases and `<object> <action noun>` phrases
pub struct WorkflowRule;

impl WorkflowRule {
    /// Head noun of the phrase after a verb, with the offset of the phrase's
    /// first word in `tokens`.
    /// A verb-lexicon word opening the phrase (`generate invoices`) is read
    /// as a noun unless it is a participle.
    fn object_head(tokens: &[Token]) -> Option<(String, usize)> {
        let mut head: Option<(String, usize)> = None;
        let mut words = 0;
        for (offset, token) in tokens.iter().enumerate() {
            if words == 0 && MODIFIERS.contains(&token.lower.as_str()) {
                continue;
            }
            let verb_as_noun = words == 0 && is_verb_noun(&token.lower);
            if is_stop_word(&token.lower)
                || (verb_base(&token.lower).is_some() && !verb_as_noun)
                || nominalized_verb(&token.lower).is_some()
                || words == MAX_OBJECT_WORDS
            {
                break;
            }
            let start = head.as_ref().map_or(offset, |(_, start)| *start);
            head = Some((singularize(&token.lower), start));
            words += 1;
        }
        head
    }
}

fn is_verb_noun(word: &str) -> bool {
    verb_base(word).is_some() && !word.ends_with("ing") && !word.ends_with("ed")
}

impl ExtractionRule for WorkflowRule {
    fn name(&self) -> &'static str {
        "workflows"
    }

    fn extract(&self, doc: &Document) -> Vec<Finding> {
        let mut findings = Vec::new();
        for clause in &doc.clauses {
            let tokens = &clause.tokens;
            let mut taken_as_object = None;
            for (i, token) in tokens.iter().enumerate() {
                if taken_as_object == Some(i) {
                    continue;
                }
                if let Some(verb) = verb_base(&token.lower) {
                    if let Some((object, offset)) = Self::object_head(&tokens[i + 1..]) {
                        let at = i + 1 + offset;
                        if verb_base(&tokens[at].lower).is_some() {
                            taken_as_object = Some(at);
                        }
                        findings.push(Finding::Workflow(format!(
                            "{}-{}",
                            verb,
                            to_kebab_case(&object)
                        )));
                        continue;
                    }
                }
                if let Some(verb) = nominalized_verb(&token.lower) {
                    let previous = i.checked_sub(1).map(|p| &tokens[p]);
                    if let Some(prev) = previous {
                        if !is_stop_word(&prev.lower)
                            && !MODIFIERS.contains(&prev.lower.as_str())
                            && verb_base(&prev.lower).is_none()
                        {
                            findings.push(Finding::Workflow(format!(
                                "{}-{}",
                                verb,
                                to_kebab_case(&singularize(&prev.lower))
                            )));
                        }
                    }
                }
            }
        }
        findings
    }
}

/// Named services (`Stripe API`, `MongoDB database`) and well-known vendors
pub struct IntegrationRule;

impl ExtractionRule for IntegrationRule {
    fn name(&self) -> &'static str {
        "integrations"
    }

    fn extract(&self, doc: &Document) -> Vec<Finding> {
        let mut found: Vec<String> = Vec::new();
        for clause in &doc.clauses {
            for caps in NAMED_INTEGRATION.captures_iter(&clause.text) {
                let name = &caps[1];
                if is_stop_word(&name.to_lowercase()) {
                    continue;
                }
                found.push(format!("{} {}", name, &caps[2]));
            }
            for token in &clause.tokens {
                let Some(vendor) = KNOWN_INTEGRATIONS
                    .iter()
                    .find(|k| k.eq_ignore_ascii_case(&token.text))
                else {
                    continue;
                };
                if !found.iter().any(|f| f.split_whitespace().next() == Some(*vendor)
                    || f.split_whitespace().next() == Some(token.text.as_str()))
                {
                    found.push(vendor.to_string());
                }
            }
        }
        found.into_iter().map(Finding::Integration).collect()
    }
}

/// Role words naming who uses the system
pub struct StakeholderRule;

impl ExtractionRule for StakeholderRule {
    fn name(&self) -> &'static str {
        "stakeholders"
    }

    fn extract(&self, doc: &Document) -> Vec<Finding> {
        doc.clauses
            .iter()
            .flat_map(|c| &c.tokens)
            .filter_map(|t| role_label(&singularize(&t.lower)))
            .map(|label| Finding::Stakeholder(label.to_string()))
            .collect()
    }
}

pub fn default_rules() -> Vec<Box<dyn ExtractionRule>> {
    vec![
        Box::new(EntityRule),
        Box::new(WorkflowRule),
        Box::new(IntegrationRule),
        Box::new(StakeholderRule),
    ]
}
