/// Returns the most frequent alphabetic character of `text`, compared case-insensitively.
///
/// Ties go to the letter that appeared first in the scan. `None` when there are no letters.
pub fn most_frequent_letter(text: &str) -> Option<char> {
    // (letter, count) in first-seen order
    let mut counts: Vec<(char, usize)> = Vec::new();

    for letter in text
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
    {
        match counts.iter_mut().find(|(seen, _)| *seen == letter) {
            Some((_, count)) => *count = count.saturating_add(1),
            None => counts.push((letter, 1)),
        }
    }

    let mut best: Option<(char, usize)> = None;
    for (letter, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((letter, count));
        }
    }

    best.map(|(letter, _)| letter)
}
