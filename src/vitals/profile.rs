use log::debug;
use serde::{Deserialize, Serialize};

use crate::types::VitalChannel;

/// Numeric parameters driving one channel for one condition.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelProfile {
    pub baseline: f64,
    pub fluctuation: f64,
    pub tick_speed_multiplier: f64,
    pub display_min: f64,
    pub display_max: f64,
    /// Hard-clamp generated values into `[display_min, display_max]`.
    #[serde(default)]
    pub clamp_to_domain: bool,
}

impl ChannelProfile {
    pub const fn new(
        baseline: f64,
        fluctuation: f64,
        tick_speed_multiplier: f64,
        domain: (f64, f64),
    ) -> Self {
        Self {
            baseline,
            fluctuation,
            tick_speed_multiplier,
            display_min: domain.0,
            display_max: domain.1,
            clamp_to_domain: false,
        }
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.display_min, self.display_max)
    }

    /// Applies the clamp policy to a freshly generated value.
    pub fn apply_domain(&self, value: f64) -> f64 {
        if self.clamp_to_domain {
            value.clamp(self.display_min, self.display_max)
        } else {
            value
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.display_min < self.baseline
            && self.baseline < self.display_max
            && self.fluctuation >= 0.0
            && self.tick_speed_multiplier > 0.0
    }
}

/// Profiles for all four channels of one condition.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileSet {
    pub hr: ChannelProfile,
    pub bp: ChannelProfile,
    pub spo2: ChannelProfile,
    pub resp: ChannelProfile,
}

impl ProfileSet {
    pub const STABLE_ADULT: ProfileSet = ProfileSet {
        hr: ChannelProfile::new(75.0, 1.0, 1.5, (50.0, 100.0)),
        bp: ChannelProfile::new(120.0, 2.0, 1.5, (70.0, 140.0)),
        spo2: ChannelProfile::new(98.0, 0.5, 1.5, (90.0, 100.0)),
        resp: ChannelProfile::new(16.0, 1.0, 1.0, (10.0, 25.0)),
    };

    pub fn channel(&self, channel: VitalChannel) -> &ChannelProfile {
        match channel {
            VitalChannel::HeartRate => &self.hr,
            VitalChannel::BloodPressure => &self.bp,
            VitalChannel::SpO2 => &self.spo2,
            VitalChannel::Respiration => &self.resp,
        }
    }

    pub fn with_clamping(mut self, clamp: bool) -> Self {
        for profile in [&mut self.hr, &mut self.bp, &mut self.spo2, &mut self.resp] {
            profile.clamp_to_domain = clamp;
        }
        self
    }
}

struct ConditionRule {
    name: &'static str,
    keywords: &'static [&'static str],
    profiles: ProfileSet,
}

pub const DEFAULT_PROFILE_NAME: &str = "stable adult";

// Checked in order; the first rule with a matching keyword wins.
const CONDITION_RULES: &[ConditionRule] = &[
    ConditionRule {
        name: "myocardial infarction",
        keywords: &["myocardial infarction", "chest pain"],
        profiles: ProfileSet {
            hr: ChannelProfile::new(110.0, 1.5, 2.5, (50.0, 150.0)),
            bp: ChannelProfile::new(95.0, 2.5, 2.5, (70.0, 130.0)),
            spo2: ChannelProfile::new(93.0, 0.5, 2.5, (85.0, 100.0)),
            resp: ChannelProfile::new(24.0, 1.0, 1.2, (10.0, 35.0)),
        },
    },
    ConditionRule {
        name: "sepsis",
        keywords: &["sepsis"],
        profiles: ProfileSet {
            hr: ChannelProfile::new(125.0, 2.0, 3.0, (60.0, 160.0)),
            bp: ChannelProfile::new(85.0, 3.0, 3.0, (60.0, 120.0)),
            spo2: ChannelProfile::new(92.0, 1.0, 3.0, (80.0, 100.0)),
            resp: ChannelProfile::new(28.0, 1.5, 1.5, (15.0, 40.0)),
        },
    },
];

/// Outcome of matching a condition string, with the rule that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedCondition {
    pub name: &'static str,
    pub profiles: ProfileSet,
}

/// Maps free-text condition to channel profiles. Never fails: anything
/// unrecognised resolves to the stable adult profile.
pub fn resolve(condition: &str) -> ProfileSet {
    resolve_named(condition).profiles
}

pub fn resolve_named(condition: &str) -> ResolvedCondition {
    let lowered = condition.to_lowercase();
    for rule in CONDITION_RULES {
        if rule.keywords.iter().any(|kw| lowered.contains(kw)) {
            return ResolvedCondition {
                name: rule.name,
                profiles: rule.profiles,
            };
        }
    }
    debug!("no profile matches {condition:?}, using {DEFAULT_PROFILE_NAME}");
    ResolvedCondition {
        name: DEFAULT_PROFILE_NAME,
        profiles: ProfileSet::STABLE_ADULT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_profile_is_well_formed() {
        let mut sets = vec![ProfileSet::STABLE_ADULT];
        sets.extend(CONDITION_RULES.iter().map(|r| r.profiles));
        for set in sets {
            for channel in VitalChannel::ALL {
                let p = set.channel(channel);
                assert!(p.is_well_formed(), "{channel:?}: {p:?}");
            }
        }
    }

    #[test]
    fn unknown_text_falls_back_to_default() {
        for text in ["", "   ", "broken ankle", "???"] {
            let resolved = resolve_named(text);
            assert_eq!(resolved.name, DEFAULT_PROFILE_NAME);
            assert_eq!(resolved.profiles, ProfileSet::STABLE_ADULT);
        }
    }

    #[test]
    fn myocardial_infarction_is_tachycardic_and_hypoxic() {
        let mi = resolve("Acute Myocardial Infarction");
        let stable = ProfileSet::STABLE_ADULT;
        assert!(mi.hr.baseline >= 100.0);
        assert!(mi.hr.baseline > stable.hr.baseline);
        assert!(mi.spo2.baseline <= 94.0);
        assert!(mi.spo2.baseline < stable.spo2.baseline);
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        assert_eq!(resolve_named("presenting with CHEST PAIN").name, "myocardial infarction");
        assert_eq!(resolve_named("Urosepsis, day 2").name, "sepsis");
    }

    #[test]
    fn first_rule_wins_on_ambiguity() {
        assert_eq!(
            resolve_named("sepsis with chest pain").name,
            "myocardial infarction"
        );
    }

    #[test]
    fn clamping_flag_applies_to_all_channels() {
        let set = resolve("sepsis").with_clamping(true);
        for channel in VitalChannel::ALL {
            let p = set.channel(channel);
            assert!(p.clamp_to_domain);
            assert_eq!(p.apply_domain(1e6), p.display_max);
            assert_eq!(p.apply_domain(-1e6), p.display_min);
        }
        let free = resolve("sepsis");
        assert_eq!(free.hr.apply_domain(1e6), 1e6);
    }
}
