// imports
use crate::cooccurrence::{Counts, Tokenizer};

use std::collections::HashMap;
use tracing::info;

/// Ordered set of words with a dense id for each, ids follow first appearance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vocab {
    t2i: HashMap<String, usize>,
    i2t: Vec<String>,
}

impl Vocab {

    pub fn build<I, S>(words: I) -> Vocab
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // a repeated word keeps the id of its first appearance
        let mut vocab = Vocab::default();
        for word in words {
            vocab.insert(word.as_ref());
        }
        vocab
    }

    fn insert(&mut self, word: &str) {
        if !self.t2i.contains_key(word) {
            self.t2i.insert(word.to_owned(), self.i2t.len());
            self.i2t.push(word.to_owned());
        }
    }

    pub fn most_frequent(documents: &[String], max_size: usize) -> Vocab {

        // count every token, remembering where it was first seen so that equal counts
        // keep corpus order. Then keep the `max_size` most common ones, most common first.
        let mut token2count: HashMap<&str, (usize, usize)> = HashMap::new();
        let mut seen = 0;
        for document in documents {
            for tok in Counts::tokenize(document) {
                let entry = token2count.entry(tok).or_insert_with(|| {
                    seen += 1;
                    (0, seen)
                });
                entry.0 += 1;
            }
        }

        let mut tup = token2count.into_iter().collect::<Vec<(&str, (usize, usize))>>();
        tup.sort_by(|(_, (c1, f1)), (_, (c2, f2))| c2.cmp(c1).then(f1.cmp(f2)));
        let n_unique = tup.len();
        tup.truncate(max_size);

        info!("using {} most common tokens out of {}", tup.len(), n_unique);
        Vocab::build(tup.into_iter().map(|(tok, _)| tok))
    }

    pub fn get_id(&self, word: &str) -> Option<usize> {
        self.t2i.get(word).copied()
    }

    pub fn get_word(&self, id: usize) -> Option<&str> {
        self.i2t.get(id).map(String::as_str)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.t2i.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.i2t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.i2t.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.i2t
    }

    pub fn word_to_id(&self) -> &HashMap<String, usize> {
        &self.t2i
    }
}


#[cfg(test)]
mod tests {

    use super::Vocab;

    #[test]
    fn build_keeps_first_occurrence() {

        let vocab = Vocab::build(["the", "cat", "the", "sat", "cat"]);

        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.get_id("the"), Some(0));
        assert_eq!(vocab.get_id("cat"), Some(1));
        assert_eq!(vocab.get_id("sat"), Some(2));
        assert_eq!(vocab.get_id("dog"), None);
        assert_eq!(vocab.get_word(3), None);
    }

    #[test]
    fn ids_are_a_bijection() {

        let words = ["monster", "bank", "cell", "apple", "bank", "axes", "apple"];
        let vocab = Vocab::build(words);

        let mut ids: Vec<usize> = vocab.words().iter().map(|w| vocab.get_id(w).unwrap()).collect();
        for w in words {
            assert_eq!(vocab.get_word(vocab.get_id(w).unwrap()), Some(w));
        }
        ids.sort();
        assert_eq!(ids, (0..vocab.len()).collect::<Vec<usize>>());
        assert_eq!(vocab.word_to_id().len(), vocab.len());
    }

    #[test]
    fn empty_input_gives_empty_vocab() {
        let vocab = Vocab::build(Vec::<String>::new());
        assert!(vocab.is_empty());
        assert_eq!(vocab.get_id(""), None);
    }

    #[test]
    fn most_frequent_orders_by_count_then_first_seen() {

        let documents = vec![
            "you are right you are".to_string(),
            "a pro a fun you".to_string(),
        ];

        // you: 3, are: 2, a: 2, right: 1, pro: 1, fun: 1
        let vocab = Vocab::most_frequent(&documents, 4);
        assert_eq!(vocab.words(), &["you", "are", "a", "right"]);

        let all = Vocab::most_frequent(&documents, 100);
        assert_eq!(all.len(), 6);
    }
}
