/*! Composite identifier.

Backs `impresso_langident_pipeline`: an ordered chain of child backends
exposed as a single classifier. The first child confident enough wins;
otherwise the first answer seen is kept as fallback.
!*/
use log::warn;

use crate::error::Error;

use super::{LanguageIdentifier, LidPrediction};

pub struct PipelineIdentifier {
    name: String,
    children: Vec<Box<dyn LanguageIdentifier>>,
    /// top-1 probability a child needs to short-circuit the chain
    confidence_threshold: f64,
}

impl PipelineIdentifier {
    pub fn new(
        name: &str,
        children: Vec<Box<dyn LanguageIdentifier>>,
        confidence_threshold: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            children,
            confidence_threshold,
        }
    }
}

impl LanguageIdentifier for PipelineIdentifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, text: &str) -> Result<Option<LidPrediction>, Error> {
        let mut fallback: Option<LidPrediction> = None;

        for child in &self.children {
            match child.predict(text) {
                Ok(Some(prediction)) => {
                    if prediction.top().prob() >= self.confidence_threshold {
                        return Ok(Some(prediction));
                    }
                    fallback.get_or_insert(prediction);
                }
                Ok(None) => (),
                Err(e) => {
                    // one broken child must not silence the rest of the chain
                    warn!("{}: child {} failed: {}", self.name, child.name(), e);
                }
            }
        }

        Ok(fallback)
    }

    fn model_version(&self) -> String {
        self.children
            .iter()
            .map(|c| c.model_version())
            .collect::<Vec<_>>()
            .join("+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::LidPrediction;

    struct Fixed(&'static str, f64);

    impl LanguageIdentifier for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn predict(&self, _text: &str) -> Result<Option<LidPrediction>, Error> {
            Ok(Some(LidPrediction::single(self.0.to_string(), self.1)))
        }
        fn model_version(&self) -> String {
            "fixed".to_string()
        }
    }

    struct Refusing;

    impl LanguageIdentifier for Refusing {
        fn name(&self) -> &str {
            "refusing"
        }
        fn predict(&self, _text: &str) -> Result<Option<LidPrediction>, Error> {
            Ok(None)
        }
        fn model_version(&self) -> String {
            "refusing".to_string()
        }
    }

    #[test]
    fn first_confident_child_wins() {
        let p = PipelineIdentifier::new(
            "pipeline",
            vec![Box::new(Fixed("lb", 0.9)), Box::new(Fixed("de", 0.99))],
            0.5,
        );
        let pred = p.predict("x").unwrap().unwrap();
        assert_eq!(pred.top().lang(), "lb");
    }

    #[test]
    fn falls_back_to_first_uncertain_answer() {
        let p = PipelineIdentifier::new(
            "pipeline",
            vec![
                Box::new(Refusing),
                Box::new(Fixed("fr", 0.3)),
                Box::new(Fixed("de", 0.4)),
            ],
            0.5,
        );
        let pred = p.predict("x").unwrap().unwrap();
        assert_eq!(pred.top().lang(), "fr");
    }

    #[test]
    fn all_refusing_is_none() {
        let p = PipelineIdentifier::new("pipeline", vec![Box::new(Refusing)], 0.5);
        assert!(p.predict("x").unwrap().is_none());
    }
}
