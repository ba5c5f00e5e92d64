use marquee_model::{Notes, Outcome, TitleEntry, TitleMap, TranslatedMap};

use super::{MergeContext, MergeResult, Mergeable, Prefer, merge_scalar};

impl Mergeable for TitleEntry {
    fn merge_from(&mut self, incoming: &Self, ctx: &mut MergeContext) -> MergeResult {
        let before = self.clone();

        match ctx.prefs.title {
            Prefer::Theirs => {
                self.text.clone_from(&incoming.text);
                if incoming.sort.is_some() {
                    self.sort.clone_from(&incoming.sort);
                }
                self.original = incoming.original;
            }
            Prefer::Mine => {
                if self.text.is_empty() {
                    self.text.clone_from(&incoming.text);
                }
                if self.sort.is_none() {
                    self.sort.clone_from(&incoming.sort);
                }
            }
        }
        self.normalize(&mut Notes::new());

        Ok(Outcome::changed(*self != before))
    }
}

impl Mergeable for TitleMap {
    fn merge_from(&mut self, incoming: &Self, ctx: &mut MergeContext) -> MergeResult {
        let mut outcome = Outcome::Unchanged;
        for (lang, title) in incoming.iter() {
            if let Some(current) = self.get_mut(lang) {
                outcome.absorb(current.merge_from(title, ctx)?);
                continue;
            }

            if title.original
                && let Some(existing) = original_language(self)
            {
                if ctx.prefs.title == Prefer::Mine {
                    continue;
                }
                self.remove(&existing);
            }
            self.insert(lang, title.clone());
            outcome = Outcome::Updated;
        }
        Ok(outcome)
    }
}

fn original_language(titles: &TitleMap) -> Option<String> {
    titles
        .iter()
        .find(|(_, title)| title.original)
        .map(|(lang, _)| lang.to_owned())
}

/// Per-language override; languages only the incoming side knows are added.
impl Mergeable for TranslatedMap<String> {
    fn merge_from(&mut self, incoming: &Self, _: &mut MergeContext) -> MergeResult {
        let mut outcome = Outcome::Unchanged;
        for (lang, text) in incoming.iter() {
            match self.get_mut(lang) {
                Some(current) => outcome.absorb(merge_scalar(current, text)),
                None => {
                    self.insert(lang, text.clone());
                    outcome = Outcome::Updated;
                }
            }
        }
        Ok(outcome)
    }
}
