use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"\w+").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "i","me","my","myself","we","our","ours","ourselves",
            "you","you're","you've","you'll","you'd","your","yours","yourself","yourselves",
            "he","him","his","himself","she","she's","her","hers","herself",
            "it","it's","its","itself","they","them","their","theirs","themselves",
            "what","which","who","whom","this","that","that'll","these","those",
            "am","is","are","was","were","be","been","being","have","has","had","having",
            "do","does","did","doing","a","an","the","and","but","if","or","because","as",
            "until","while","of","at","by","for","with","about","against","between","into",
            "through","during","before","after","above","below","to","from","up","down",
            "in","out","on","off","over","under","again","further","then","once",
            "here","there","when","where","why","how","all","any","both","each","few",
            "more","most","other","some","such","no","nor","not","only","own","same",
            "so","than","too","very","s","t","can","will","just","don","don't",
            "should","should've","now","d","ll","m","o","re","ve","y",
            "ain","aren","aren't","couldn","couldn't","didn","didn't","doesn","doesn't",
            "hadn","hadn't","hasn","hasn't","haven","haven't","isn","isn't","ma",
            "mightn","mightn't","mustn","mustn't","needn","needn't","shan","shan't",
            "shouldn","shouldn't","wasn","wasn't","weren","weren't","won","won't",
            "wouldn","wouldn't"
        ];
        words.iter().copied().collect()
    };
}

/// Whether a lowercase word is excluded from phrase queries.
pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Split text into lowercase word tokens in order of appearance.
///
/// A token is a maximal run of word characters; the index of a token in the
/// returned vector is its position. No stopword filtering happens here.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    RE.find_iter(&lowered).map(|m| m.as_str().to_string()).collect()
}
