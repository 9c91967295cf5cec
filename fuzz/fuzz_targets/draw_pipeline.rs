//! Fuzz target for the full draw pipeline
//!
//! Seeded draws over arbitrary rosters. Every successful draw must reveal a
//! valid derangement that honours the roster's constraints.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use santa_core::{PairingConfig, RevealQuery, SecretSanta, SeededEnv, parse_instructions, reveal};

#[derive(Debug, Arbitrary)]
struct DrawScenario {
    seed: u64,
    /// Participant count minus two
    extra: u8,
    /// Exclusions as index pairs
    exclusions: Vec<(u8, u8)>,
    max_attempts: u8,
}

fuzz_target!(|scenario: DrawScenario| {
    let size = 2 + usize::from(scenario.extra % 10);
    let mut lines: Vec<String> = (0..size).map(|i| format!("P{i}")).collect();
    for (a, b) in scenario.exclusions.iter().take(20) {
        let (a, b) = (usize::from(*a) % size, usize::from(*b) % size);
        if a != b {
            lines[a].push_str(&format!(" !P{b}"));
        }
    }
    let text = lines.join("\n");

    let Ok(roster) = parse_instructions(&text) else {
        return;
    };
    let config =
        PairingConfig { max_attempts: u32::from(scenario.max_attempts), exact_fallback: true };
    let santa = SecretSanta::new(SeededEnv::new(scenario.seed), config);

    let Ok(draw) = santa.draw(&text) else {
        return;
    };
    assert_eq!(draw.len(), size);

    let mut received = vec![false; size];
    for issued in draw.tokens() {
        let query = RevealQuery { name: None, token: issued.token.clone() };
        let partner = reveal(&query).map(|r| r.partner);
        let Ok(partner) = partner else {
            panic!("issued token failed to decode");
        };
        let giver = roster.find(&issued.giver).map(|id| id.index());
        let receiver = roster.find(&partner).map(|id| id.index());
        let (Some(giver), Some(receiver)) = (giver, receiver) else {
            panic!("decoded name is not in the roster");
        };

        assert_ne!(giver, receiver);
        assert!(!received[receiver]);
        received[receiver] = true;
    }
});
