//! Robots.txt ruleset parsing and path evaluation
//!
//! Directive lines are grouped by user-agent block. Evaluation matches the
//! requesting path against the longest applicable rule prefix in the
//! matching block, falling back to the wildcard `*` block; on equal prefix
//! length an `Allow` rule wins over a `Disallow`.

/// Upper bound on an honored crawl-delay, in seconds; anything larger is
/// treated as this value
const MAX_CRAWL_DELAY_SECS: f64 = 3600.0;

/// One allow/disallow rule within an agent block
#[derive(Debug, Clone, PartialEq)]
struct Rule {
    allow: bool,
    path: String,
}

/// A user-agent block with its rules and optional crawl-delay
#[derive(Debug, Clone, Default)]
struct AgentGroup {
    /// Lowercased agent names this block applies to
    agents: Vec<String>,
    rules: Vec<Rule>,
    crawl_delay: Option<f64>,
}

impl AgentGroup {
    fn is_wildcard(&self) -> bool {
        self.agents.iter().any(|a| a == "*")
    }

    fn matches_agent(&self, user_agent_lower: &str) -> bool {
        self.agents
            .iter()
            .any(|a| a != "*" && user_agent_lower.contains(a.as_str()))
    }
}

#[derive(Debug, Clone)]
enum Policy {
    /// No policy found; everything is allowed
    AllowAll,
    /// Malformed policy; everything is denied
    DenyAll,
    Groups(Vec<AgentGroup>),
}

/// Parsed crawl policy for one domain
#[derive(Debug, Clone)]
pub struct RobotsRules {
    policy: Policy,
}

impl RobotsRules {
    /// A permissive ruleset used when no robots.txt exists
    pub fn allow_all() -> Self {
        Self {
            policy: Policy::AllowAll,
        }
    }

    /// A restrictive ruleset used when a fetched robots.txt is malformed
    pub fn deny_all() -> Self {
        Self {
            policy: Policy::DenyAll,
        }
    }

    /// Parses robots.txt content into a ruleset
    ///
    /// Parse errors are reported rather than papered over so the checker can
    /// fall back to deny-all: a directive line without a colon, or a rule
    /// appearing before any `User-agent` line, is malformed.
    ///
    /// # Arguments
    ///
    /// * `content` - Raw robots.txt file content
    ///
    /// # Returns
    ///
    /// * `Ok(RobotsRules)` - Parsed ruleset
    /// * `Err(String)` - Description of the malformed line
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut groups: Vec<AgentGroup> = Vec::new();
        let mut current: Option<AgentGroup> = None;
        // After a rule line, another User-agent directive starts a new group
        // rather than extending the current one.
        let mut group_has_rules = false;

        for (line_no, line) in content.lines().enumerate() {
            // Strip inline comments, then whitespace
            let trimmed = match line.split_once('#') {
                Some((before, _)) => before.trim(),
                None => line.trim(),
            };

            if trimmed.is_empty() {
                continue;
            }

            let (key, value) = trimmed
                .split_once(':')
                .ok_or_else(|| format!("line {}: directive without ':'", line_no + 1))?;

            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if group_has_rules || current.is_none() {
                        if let Some(group) = current.take() {
                            groups.push(group);
                        }
                        current = Some(AgentGroup::default());
                        group_has_rules = false;
                    }
                    if let Some(group) = current.as_mut() {
                        group.agents.push(value.to_lowercase());
                    }
                }
                "disallow" | "allow" => {
                    let group = current
                        .as_mut()
                        .ok_or_else(|| format!("line {}: rule before any User-agent", line_no + 1))?;
                    group_has_rules = true;

                    // An empty Disallow value means "allow everything" and
                    // adds no rule.
                    if !value.is_empty() {
                        group.rules.push(Rule {
                            allow: key == "allow",
                            path: value.to_string(),
                        });
                    }
                }
                "crawl-delay" => {
                    let group = current.as_mut().ok_or_else(|| {
                        format!("line {}: crawl-delay before any User-agent", line_no + 1)
                    })?;
                    group_has_rules = true;
                    // "inf", "NaN", and negative values parse as f64 but are
                    // not usable delays; ignore them and cap the rest.
                    if let Ok(delay) = value.parse::<f64>() {
                        if delay.is_finite() && delay >= 0.0 {
                            group.crawl_delay = Some(delay.min(MAX_CRAWL_DELAY_SECS));
                        }
                    }
                }
                // Sitemap, Host and unknown directives are ignored
                _ => {}
            }
        }

        if let Some(group) = current.take() {
            groups.push(group);
        }

        Ok(Self {
            policy: Policy::Groups(groups),
        })
    }

    /// Checks whether a path is allowed for the given user agent
    pub fn is_allowed(&self, path: &str, user_agent: &str) -> bool {
        let groups = match &self.policy {
            Policy::AllowAll => return true,
            Policy::DenyAll => return false,
            Policy::Groups(groups) => groups,
        };

        let group = match select_group(groups, user_agent) {
            Some(g) => g,
            // No applicable block imposes no restriction
            None => return true,
        };

        // Longest matching prefix wins; Allow wins ties.
        let mut best: Option<&Rule> = None;
        for rule in &group.rules {
            if path.starts_with(rule.path.as_str()) {
                let better = match best {
                    None => true,
                    Some(current) => {
                        rule.path.len() > current.path.len()
                            || (rule.path.len() == current.path.len() && rule.allow)
                    }
                };
                if better {
                    best = Some(rule);
                }
            }
        }

        best.map(|rule| rule.allow).unwrap_or(true)
    }

    /// Returns the crawl-delay for the given user agent, in seconds
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let groups = match &self.policy {
            Policy::Groups(groups) => groups,
            _ => return None,
        };

        select_group(groups, user_agent).and_then(|g| g.crawl_delay)
    }
}

/// Selects the agent block applying to a user agent
///
/// A block naming the agent specifically is preferred over the wildcard
/// block.
fn select_group<'a>(groups: &'a [AgentGroup], user_agent: &str) -> Option<&'a AgentGroup> {
    let ua_lower = user_agent.to_lowercase();

    groups
        .iter()
        .find(|g| g.matches_agent(&ua_lower))
        .or_else(|| groups.iter().find(|g| g.is_wildcard()))
}
