//! Coin Wallet
//!
//! Coin balance persisted next to the match progress, and the quiz round
//! tally that pays into it.

use tracing::info;

use crate::core::codec;
use crate::core::store::SharedStore;

/// Store key for the coin balance.
pub const COINS_KEY: &str = "coinsBalance";

/// Coins won or lost per quiz answer.
pub const ANSWER_REWARD: i64 = 20;

/// Persistent coin balance.
#[derive(Clone)]
pub struct CoinWallet {
    store: SharedStore,
}

impl CoinWallet {
    /// Wallet over `store`.
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Current balance; missing or unreadable reads as zero.
    pub fn balance(&self) -> u64 {
        codec::load::<u64>(self.store.as_ref(), COINS_KEY).unwrap_or(0)
    }

    /// Add `amount` and persist. Returns the new balance.
    pub fn deposit(&self, amount: u64) -> u64 {
        let balance = self.balance().saturating_add(amount);
        codec::save(self.store.as_ref(), COINS_KEY, &balance);
        balance
    }
}

/// Result of answering one quiz question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Round already over.
    Ignored,
    /// Score moved by `delta`; more questions remain.
    Scored {
        /// +20 or -20.
        delta: i64,
    },
    /// Last question answered; `deposited` coins went to the wallet.
    Finished {
        /// +20 or -20.
        delta: i64,
        /// Final round score clamped at zero.
        deposited: u64,
    },
}

/// Score keeping for one quiz round.
#[derive(Clone, Debug)]
pub struct QuizTally {
    question_count: usize,
    answered: usize,
    score: i64,
}

impl QuizTally {
    /// Round of `question_count` questions.
    pub fn new(question_count: usize) -> Self {
        Self {
            question_count,
            answered: 0,
            score: 0,
        }
    }

    /// Round score so far (may be negative).
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Zero-based index of the question being asked.
    pub fn current_question(&self) -> usize {
        self.answered
    }

    /// All questions answered.
    pub fn is_finished(&self) -> bool {
        self.answered >= self.question_count
    }

    /// Record an answer; the last one pays `max(score, 0)` into `wallet`.
    pub fn answer(&mut self, correct: bool, wallet: &CoinWallet) -> AnswerOutcome {
        if self.is_finished() {
            return AnswerOutcome::Ignored;
        }

        let delta = if correct { ANSWER_REWARD } else { -ANSWER_REWARD };
        self.score += delta;
        self.answered += 1;

        if !self.is_finished() {
            return AnswerOutcome::Scored { delta };
        }

        let deposited = self.score.max(0) as u64;
        let balance = wallet.deposit(deposited);
        info!("Quiz finished: score={} deposited={} balance={}", self.score, deposited, balance);
        AnswerOutcome::Finished { delta, deposited }
    }
}
