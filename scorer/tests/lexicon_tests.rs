use scorer::lexicon::{Lexicon, LexiconConfig};

#[test]
fn it_normalizes_and_stems() {
    let lex = Lexicon::new(&LexiconConfig::default()).unwrap();
    let words = lex.keywords("Running Runners RUN! The café's menu.");
    assert!(words.contains(&"run".to_string()));
    assert!(words.iter().any(|w| w.starts_with("café")));
}

#[test]
fn it_filters_stopwords_and_title_filler() {
    let lex = Lexicon::new(&LexiconConfig::default()).unwrap();
    let words = lex.keywords("Hiring: the Backend Engineer role, remote");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"hire".to_string()) && !words.contains(&"hiring".to_string()));
    assert!(!words.contains(&"remot".to_string()) && !words.contains(&"remote".to_string()));
    assert!(words.contains(&"backend".to_string()));
    assert!(words.contains(&"engin".to_string()));
}

#[test]
fn extra_stopwords_are_honoured() {
    let cfg = LexiconConfig { extra_stopwords: vec!["Intern".into()], ..Default::default() };
    let lex = Lexicon::new(&cfg).unwrap();
    assert!(lex.keywords("Data intern").iter().all(|w| w != "intern"));
}

#[test]
fn normalize_folds_width_and_case() {
    let lex = Lexicon::new(&LexiconConfig::default()).unwrap();
    assert_eq!(lex.normalize("  ＲＥＡＣＴ   Native "), "react native");
}
