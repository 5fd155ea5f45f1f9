//! Static landing page copy.

/// Brand name shown in the header.
pub const BRAND: &str = "SoftSell";

/// Document head metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteMetadata {
    pub title: &'static str,
    pub description: &'static str,
}

pub const METADATA: SiteMetadata = SiteMetadata {
    title: "SoftSell - Software License Resale Platform",
    description: "Sell your unused software licenses securely with SoftSell",
};

pub const HERO_TITLE: &str = "Turn Unused Software into Cash";
pub const HERO_SUBTITLE: &str = "Sell your software licenses securely with our trusted platform";
pub const HERO_CTA: &str = "Get Instant Valuation";

pub const FOOTER: &str = "© 2025 SoftSell. All rights reserved.";

/// Icon, title and one-line description. Used by the step and feature grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoCard {
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

/// "How It Works" steps.
pub const STEPS: [InfoCard; 3] = [
    InfoCard {
        icon: "⬆️",
        title: "Upload License",
        description: "Submit your license details securely.",
    },
    InfoCard {
        icon: "💰",
        title: "Get Valuation",
        description: "Receive an instant, fair offer.",
    },
    InfoCard {
        icon: "🏦",
        title: "Get Paid",
        description: "Accept and get paid fast.",
    },
];

/// "Why Choose Us" features.
pub const FEATURES: [InfoCard; 4] = [
    InfoCard {
        icon: "🔒",
        title: "Secure",
        description: "Your data and transactions are protected.",
    },
    InfoCard {
        icon: "⚡",
        title: "Fast Payments",
        description: "Get paid within 24 hours of acceptance.",
    },
    InfoCard {
        icon: "💡",
        title: "Expert Valuations",
        description: "Fair pricing from software experts.",
    },
    InfoCard {
        icon: "🤝",
        title: "Trusted by 1000+ Clients",
        description: "Proven track record in license resale.",
    },
];

/// A customer quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Testimonial {
    pub name: &'static str,
    pub role: &'static str,
    pub company: &'static str,
    pub text: &'static str,
}

pub const TESTIMONIALS: [Testimonial; 2] = [
    Testimonial {
        name: "Jane Doe",
        role: "IT Manager",
        company: "Acme Corp",
        text: "SoftSell made selling our unused licenses effortless and fast. Highly recommended!",
    },
    Testimonial {
        name: "John Smith",
        role: "Procurement Lead",
        company: "Beta Ltd",
        text: "Great service, transparent process, and quick payment. Will use again!",
    },
];

/// Confirmation that replaces the submit button.
pub const CONTACT_CONFIRMATION: &str = "Thank you! We'll get back to you soon.";
