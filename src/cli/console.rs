use colored::*;
use serde_json::Value;

use crate::admin::Agent;
use crate::decision::Decision;
use crate::error::PolicyDenied;

/// Console handles all terminal output with colored formatting
pub struct Console {
    allow_color: Color,
    deny_color: Color,
}

impl Console {
    /// Create a new Console with default colors
    pub fn new() -> Self {
        Self {
            allow_color: Color::Green,
            deny_color: Color::Red,
        }
    }

    /// Create a new Console with custom colors
    pub fn with_colors(allow_color: Color, deny_color: Color) -> Self {
        Self {
            allow_color,
            deny_color,
        }
    }

    /// Print a decision with its attribution
    pub fn print_decision(&self, decision: &Decision) {
        let verdict = if decision.allowed {
            "ALLOW".color(self.allow_color).bold()
        } else {
            "DENY".color(self.deny_color).bold()
        };
        println!("{} {}", verdict, decision.action);
        self.print_field("policy", decision.policy.as_deref());
        self.print_field("rule", decision.rule.as_deref());
        self.print_field("reason", decision.reason.as_deref());
        self.print_field("trace", Some(&decision.trace_id));
    }

    /// Print a denial on one line
    pub fn print_denial(&self, denied: &PolicyDenied) {
        eprintln!("{} {}", "Denied:".color(self.deny_color).bold(), denied);
    }

    /// Print an agent listing
    pub fn print_agents(&self, agents: &[Agent]) {
        if agents.is_empty() {
            self.print_system("No agents registered.");
            return;
        }
        for agent in agents {
            let tags = if agent.tags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", agent.tags.join(", "))
            };
            println!(
                "{}  {} ({}){}",
                agent.id.bold(),
                agent.name,
                agent.trust_tier.cyan(),
                tags.bright_black()
            );
        }
    }

    /// Print a JSON value as pretty text
    pub fn print_json(&self, value: &Value) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{}", text),
            Err(_) => println!("{}", value),
        }
    }

    /// Print a system message (info, status)
    pub fn print_system(&self, message: &str) {
        println!("{} {}", "System:".yellow().bold(), message);
    }

    /// Print an error message
    pub fn print_error(&self, error: &str) {
        eprintln!("{} {}", "Error:".red().bold(), error);
    }

    fn print_field(&self, label: &str, value: Option<&str>) {
        if let Some(value) = value {
            println!("  {:<7}{}", format!("{}:", label).bright_black(), value);
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
