//! Prompt template
//!
//! Placeholders: `{amount}` `{type}` `{oldbalanceOrg}` `{newbalanceOrig}`
//! `{nameDest}` `{retrieved_documents}` `{isFraud}`. Anything else in
//! braces is left as is.

use std::io;
use std::path::Path;

use crate::logic::model::Verdict;
use crate::logic::transaction::Transaction;

pub const DEFAULT_TEMPLATE: &str = "\
A transaction was scored by the fraud detection model.

Transaction:
- Amount: {amount}
- Type: {type}
- Sender balance before: {oldbalanceOrg}
- Sender balance after: {newbalanceOrig}
- Receiver: {nameDest}
- Model fraud prediction: {isFraud}

Context retrieved from fraud patterns, rules, past decisions and account history:
{retrieved_documents}

Using only the context above, explain in 3 to 5 short bullet points:
- why the transaction was or was not flagged as fraud,
- which known fraud patterns or rules it matches, if any,
- how it compares to the sender's historical behavior and to similar past cases.
Answer with the bullet points only.
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self { text: DEFAULT_TEMPLATE.to_string() }
    }
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Template from `path`, or the built-in one when no path is set
    pub fn load(path: Option<&Path>) -> io::Result<Self> {
        match path {
            Some(p) => {
                let text = std::fs::read_to_string(p)?;
                log::info!("Loaded prompt template from {}", p.display());
                Ok(Self::new(text))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn render(&self, tx: &Transaction, verdict: &Verdict, retrieved_documents: &str) -> String {
        let substitutions = [
            ("{amount}", tx.amount.to_string()),
            ("{type}", tx.tx_type.to_string()),
            ("{oldbalanceOrg}", tx.oldbalance_org.to_string()),
            ("{newbalanceOrig}", tx.newbalance_orig.to_string()),
            ("{nameDest}", tx.name_dest.clone()),
            ("{isFraud}", verdict.is_fraud.to_string()),
        ];

        let mut prompt = self.text.clone();
        for (placeholder, value) in substitutions {
            prompt = prompt.replace(placeholder, &value);
        }
        // Last, so retrieved text that happens to contain a placeholder stays verbatim
        prompt.replace("{retrieved_documents}", retrieved_documents)
    }
}
