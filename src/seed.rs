use crate::model::Bookmark;

const SEED: &[(&str, &str, &str, &str, &[&str], &str)] = &[
    (
        "seed1",
        "https://github.com",
        "GitHub: Where the world builds software",
        "GitHub is where over 100 million developers shape the future of software, together.",
        &["development", "git", "coding"],
        "2026-02-14T10:00:00.000Z",
    ),
    (
        "seed2",
        "https://stackoverflow.com",
        "Stack Overflow - Where Developers Learn, Share, & Build Careers",
        "Stack Overflow is the largest, most trusted online community for developers to learn and share their programming knowledge.",
        &["development", "community", "programming"],
        "2026-02-14T11:00:00.000Z",
    ),
    (
        "seed3",
        "https://developer.mozilla.org",
        "MDN Web Docs",
        "The MDN Web Docs site provides information about Open Web technologies including HTML, CSS, and APIs for both Web sites and progressive web apps.",
        &["documentation", "web", "reference"],
        "2026-02-14T12:00:00.000Z",
    ),
    (
        "seed4",
        "https://nodejs.org",
        "Node.js",
        "Node.js® is an open-source, cross-platform JavaScript runtime environment.",
        &["javascript", "runtime", "backend"],
        "2026-02-14T13:00:00.000Z",
    ),
    (
        "seed5",
        "https://www.npmjs.com",
        "npm | Build amazing things",
        "We're npm, Inc., the company behind Node package manager, the world's largest software registry.",
        &["javascript", "packages", "tools"],
        "2026-02-14T14:00:00.000Z",
    ),
    (
        "seed6",
        "https://expressjs.com",
        "Express - Node.js web application framework",
        "Fast, unopinionated, minimalist web framework for Node.js",
        &["javascript", "framework", "backend"],
        "2026-02-14T15:00:00.000Z",
    ),
    (
        "seed7",
        "https://code.visualstudio.com",
        "Visual Studio Code",
        "Visual Studio Code is a lightweight but powerful source code editor which runs on your desktop.",
        &["editor", "development", "tools"],
        "2026-02-14T16:00:00.000Z",
    ),
];

/// Example collection written out when no backing file exists yet.
pub fn seed_bookmarks() -> Vec<Bookmark> {
    SEED.iter()
        .map(|(id, url, title, description, tags, created_at)| Bookmark {
            id: id.to_string(),
            url: url.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: created_at.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Draft;
    use crate::validation;

    #[test]
    fn test_seed_is_valid() {
        let seed = seed_bookmarks();
        assert_eq!(seed.len(), 7);

        for bookmark in &seed {
            let draft = Draft {
                url: bookmark.url.clone(),
                title: bookmark.title.clone(),
                description: bookmark.description.clone(),
                tags: bookmark.tags.clone(),
                ..Default::default()
            };
            assert!(validation::validate(&draft).is_empty(), "{} is invalid", bookmark.id);
        }

        let ids: Vec<_> = seed.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["seed1", "seed2", "seed3", "seed4", "seed5", "seed6", "seed7"]);
    }
}
