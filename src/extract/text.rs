use scraper::ElementRef;

/// First non-blank text node that is a direct child of `element`, trimmed
pub(crate) fn own_text(element: ElementRef<'_>) -> Option<String> {
    element
        .children()
        .filter_map(|node| node.value().as_text().map(|text| text.trim()))
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

/// All descendant text of `element`, trimmed pieces joined by single spaces
pub(crate) fn joined_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
