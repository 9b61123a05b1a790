//! Rule-based responder for the in-app assistant.
//!
//! An ordered list of rules is scanned top to bottom against the trimmed,
//! lowercased input and the first matching rule answers. Earlier rules win
//! over later, broader ones, so the table order is part of the behaviour.
//! Unmatched input gets a fallback that quotes the question back.

use crate::errors::Result;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

/// Category of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Salutations
    Greeting,
    /// How to create a loan
    LoanCreation,
    /// Required documents
    RequiredDocuments,
    /// Eligibility criteria
    Eligibility,
    /// Loan amount ranges
    LoanAmount,
    /// Interest rate ranges
    InterestRate,
    /// Tenure ranges
    Tenure,
    /// EMI explanation
    Emi,
    /// OTP verification
    Otp,
    /// PDF download
    PdfDownload,
    /// Dashboard overview
    Dashboard,
    /// Login and demo credentials
    Login,
    /// Navigation
    Navigation,
    /// Feature overview
    Features,
    /// Help and support
    Help,
    /// Thanks
    Thanks,
    /// Farewell
    Farewell,
    /// Rule added through configuration
    Custom,
    /// Nothing matched
    Fallback,
}

const STANDARD_RULES: &[(Topic, &str, &str)] = &[
    (
        Topic::Greeting,
        r"^(hi|hello|hey|good morning|good afternoon|good evening)",
        "Hello! How can I assist you with your loan-related queries today?",
    ),
    (
        Topic::LoanCreation,
        r"personal loan|add personal loan|create personal loan",
        "To add a personal loan, click on the \"Personal Loans\" card on the dashboard or navigate to Personal Loans page and click \"Add Personal Loan\". You'll need to provide borrower details, loan amount, interest rate, tenure, and upload Aadhaar and PAN cards.",
    ),
    (
        Topic::RequiredDocuments,
        r"personal loan documents|what documents|required documents|documents needed",
        "For a personal loan application, you need to provide:\n• Aadhaar Card (PDF, JPG, or PNG)\n• PAN Card (PDF, JPG, or PNG)\n• Borrower details (Name, Phone, Email, Address)\n• Loan details (Amount, Interest Rate, Tenure)\n\nAll documents should be clear and valid. Maximum file size is 10MB per document.",
    ),
    (
        Topic::Eligibility,
        r"personal loan eligibility|eligibility criteria|who can apply",
        "Personal loan eligibility typically includes:\n• Valid Aadhaar Card\n• Valid PAN Card\n• Minimum age: 21 years\n• Maximum age: 65 years\n• Regular source of income\n• Good credit history\n\nSpecific eligibility criteria may vary based on the lender's policies.",
    ),
    (
        Topic::LoanAmount,
        r"loan amount|how much|maximum loan|minimum loan",
        "The loan amount depends on various factors including your income, credit score, and repayment capacity. In this application, you can apply for any amount starting from ₹10,000. The maximum amount depends on your eligibility and the lender's policies.",
    ),
    (
        Topic::InterestRate,
        r"interest rate|rate of interest|loan interest",
        "Interest rates for personal loans typically range from 10% to 30% per annum, depending on various factors like credit score, income, loan amount, and tenure. You can specify the interest rate when creating a loan application.",
    ),
    (
        Topic::Tenure,
        r"loan tenure|tenure|repayment period|how long|duration",
        "Personal loan tenure can range from 1 month to 5 years (60 months). You can choose the tenure based on your repayment capacity. Longer tenures result in lower EMIs but higher total interest, while shorter tenures have higher EMIs but lower total interest.",
    ),
    (
        Topic::Emi,
        r"emi|monthly payment|installment|repayment",
        "EMI (Equated Monthly Installment) is the fixed amount you pay each month towards your loan. It includes both principal and interest. The EMI amount depends on the loan amount, interest rate, and tenure. You can use the EMI calculator to estimate your monthly payments.",
    ),
    (
        Topic::Otp,
        r"otp|verification|phone verification|verify phone",
        "OTP (One-Time Password) verification is required to verify the borrower's phone number. After entering the phone number, click \"Send OTP\" to receive a 6-digit code. Enter the code to verify your phone number. For testing purposes, any 6-digit code will be accepted.",
    ),
    (
        Topic::PdfDownload,
        r"pdf|download|generate pdf|loan document",
        "After successfully submitting a personal loan application, a PDF document is automatically generated and downloaded. The PDF includes:\n• Loan Application Summary\n• Borrower Details\n• Terms and Conditions\n• Signature sections\n\nYou can find the downloaded PDF in your Downloads folder.",
    ),
    (
        Topic::Dashboard,
        r"dashboard|home|main page|overview",
        "The dashboard provides an overview of all your loans, including:\n• Total loans and amounts\n• Loan distribution by type (Personal, Vehicle, Business, Medical)\n• Recent loans\n• Notifications\n• Quick actions\n\nYou can access different sections from the dashboard.",
    ),
    (
        Topic::Login,
        r"login|sign in|credentials|password",
        "To login, use these demo credentials:\n• Loan Officer: officer@loantracker.com / officer123\n• Borrower: borrower@example.com / borrower123\n\nAfter login, you'll be redirected to the dashboard.",
    ),
    (
        Topic::Navigation,
        r"how to|where|navigate|go to|access",
        "You can navigate through the application using:\n• Dashboard cards to access different loan types\n• Navigation menu in the header\n• Breadcrumbs at the top of pages\n• \"Add Loan\" buttons on list pages\n\nClick on the Personal Loans card on the dashboard to view all personal loans.",
    ),
    (
        Topic::Features,
        r"features|what can|capabilities|functionality",
        "LoanTracker offers the following features:\n• Create and manage personal loans\n• View loan details and status\n• Generate PDF loan documents\n• Track loan applications\n• Document workflow management\n• Profile and activity tracking\n• Search and filter loans\n\nIs there a specific feature you'd like to know more about?",
    ),
    (
        Topic::Help,
        r"help|support|assistance|problem|issue|error",
        "I'm here to help! You can ask me about:\n• How to create a personal loan\n• Required documents\n• Loan eligibility\n• Interest rates and tenure\n• EMI calculations\n• PDF generation\n• Navigation and features\n\nWhat would you like to know?",
    ),
    (
        Topic::Thanks,
        r"thank|thanks|appreciate",
        "You're welcome! Is there anything else I can help you with?",
    ),
    (
        Topic::Farewell,
        r"bye|goodbye|see you|exit",
        "Thank you for using LoanTracker! Have a great day. If you need any assistance, feel free to ask anytime.",
    ),
];

/// Reply used when no rule matches; quotes the original input.
#[must_use]
pub fn fallback_reply(input: &str) -> String {
    format!(
        "I understand you're asking about: \"{input}\". Could you please rephrase your question? I can help you with:\n• Personal loan applications\n• Required documents\n• Loan eligibility\n• Interest rates and tenure\n• EMI calculations\n• Navigation and features\n• General loan information"
    )
}

/// A configured rule, as read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleSpec {
    /// Regular expression tested against the lowercased input
    pub pattern: String,
    /// Reply text
    pub reply: String,
}

/// One compiled rule.
#[derive(Debug, Clone)]
pub struct Rule {
    topic: Topic,
    pattern: Regex,
    reply: String,
}

impl Rule {
    /// Compiles a case-insensitive rule.
    pub fn new(topic: Topic, pattern: &str, reply: impl Into<String>) -> Result<Self> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            topic,
            pattern,
            reply: reply.into(),
        })
    }

    /// Category of this rule.
    #[must_use]
    pub const fn topic(&self) -> Topic {
        self.topic
    }

    fn matches(&self, normalized: &str) -> bool {
        self.pattern.is_match(normalized)
    }
}

/// A classified reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Which rule answered
    pub topic: Topic,
    /// Reply text
    pub text: String,
}

/// Stateless first-match responder.
#[derive(Debug, Clone)]
pub struct Responder {
    rules: Vec<Rule>,
}

impl Responder {
    /// Responder with the built-in rule table.
    pub fn standard() -> Result<Self> {
        Self::with_extra_rules(&[])
    }

    /// Built-in rules preceded by `extra`, which therefore take precedence.
    pub fn with_extra_rules(extra: &[RuleSpec]) -> Result<Self> {
        let mut rules = Vec::with_capacity(extra.len() + STANDARD_RULES.len());
        for spec in extra {
            rules.push(Rule::new(Topic::Custom, &spec.pattern, spec.reply.clone())?);
        }
        for (topic, pattern, reply) in STANDARD_RULES {
            rules.push(Rule::new(*topic, pattern, *reply)?);
        }
        Ok(Self { rules })
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Answers `input` and reports which rule did.
    #[must_use]
    pub fn reply(&self, input: &str) -> Response {
        let normalized = input.trim().to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map_or_else(
                || Response {
                    topic: Topic::Fallback,
                    text: fallback_reply(input),
                },
                |rule| Response {
                    topic: rule.topic,
                    text: rule.reply.clone(),
                },
            )
    }

    /// The reply text for `input`.
    #[must_use]
    pub fn respond(&self, input: &str) -> String {
        self.reply(input).text
    }

    /// The category `input` falls into.
    #[must_use]
    pub fn classify(&self, input: &str) -> Topic {
        self.reply(input).topic
    }
}
