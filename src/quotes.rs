use rand::{
    Rng,
    seq::SliceRandom as _,
};

pub(crate) const DEFAULT_QUOTES: [&str; 5] = [
    "Sometimes I wonder if I'm holding my sword the wrong way...",
    "They told me to follow my heart… problem is, I'm not sure where I left it.",
    "Failure builds character. At this rate, I must be the most 'characterful' bloke alive.",
    "Yer ma's a boot",
    "People on zero deserve to be at the bottom 👀",
];

pub(crate) fn default_quotes() -> Vec<String> {
    DEFAULT_QUOTES.iter().map(|quote| quote.to_string()).collect()
}

/// Hands out quotes in random order without repeating one until all have been used.
pub(crate) struct QuotePool {
    quotes: Vec<String>,
    deck: Vec<usize>,
}

impl QuotePool {
    pub(crate) fn new(quotes: Vec<String>) -> Self {
        Self { quotes, deck: Vec::default() }
    }

    pub(crate) fn next(&mut self) -> Option<&str> {
        self.next_with(&mut rand::rng())
    }

    fn next_with(&mut self, rng: &mut impl Rng) -> Option<&str> {
        if self.deck.is_empty() {
            self.deck = (0..self.quotes.len()).collect();
            self.deck.shuffle(rng);
        }
        let idx = self.deck.pop()?;
        Some(&self.quotes[idx])
    }
}
