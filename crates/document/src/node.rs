//! An owned, mutable XML element tree.
//!
//! Elements are addressed either by reference or by an [`ElementPath`], the
//! list of child indices leading from the root to the element. Ordering
//! element paths lexicographically yields document order.

use crate::error::DocumentError;

/// Child indices from the root element down to an element.
pub type ElementPath = Vec<usize>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Attributes in source order.
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Sets an attribute, keeping its position when it already exists.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(index).value)
    }

    /// Parses a numeric attribute. A missing or empty attribute reads as `None`.
    pub fn attr_f64(&self, name: &str) -> Result<Option<f64>, DocumentError> {
        self.parse_attr(name)
    }

    pub fn attr_i64(&self, name: &str) -> Result<Option<i64>, DocumentError> {
        self.parse_attr(name)
    }

    fn parse_attr<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, DocumentError> {
        match self.attr(name).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| DocumentError::InvalidAttribute {
                    element: self.name.clone(),
                    attribute: name.to_string(),
                    value: raw.to_string(),
                }),
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.name == name)
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.child_elements_mut().find(|e| e.name == name)
    }

    /// Index into `children` of the first child element named `name`.
    pub fn position_of_child(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|n| n.as_element().is_some_and(|e| e.name == name))
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// All descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    /// Number of descendant elements named `name`.
    pub fn count_descendants(&self, name: &str) -> usize {
        self.descendants().filter(|e| e.name == name).count()
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    pub fn get_path(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for &index in path {
            current = current.children.get(index)?.as_element()?;
        }
        Some(current)
    }

    pub fn get_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &index in path {
            current = current.children.get_mut(index)?.as_element_mut()?;
        }
        Some(current)
    }

    /// Paths of all descendant elements (excluding `self`) in document order,
    /// each prefixed with `base`.
    pub fn descendant_paths(&self, base: &[usize]) -> Vec<ElementPath> {
        let mut out = Vec::new();
        collect_paths(self, &mut base.to_vec(), &mut out);
        out
    }

    /// Visits `self` and every descendant element in document order.
    pub fn walk_mut<F: FnMut(&mut Element)>(&mut self, f: &mut F) {
        f(self);
        for child in self.child_elements_mut() {
            child.walk_mut(f);
        }
    }
}

fn collect_paths(element: &Element, prefix: &mut Vec<usize>, out: &mut Vec<ElementPath>) {
    for (index, child) in element.children.iter().enumerate() {
        if let Node::Element(e) = child {
            prefix.push(index);
            out.push(prefix.clone());
            collect_paths(e, prefix, out);
            prefix.pop();
        }
    }
}

/// Depth-first iterator over descendant elements.
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(Node::Element(e)) => {
                    self.stack.push(e.children.iter());
                    return Some(e);
                }
                Some(Node::Text(_)) => continue,
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        Element::new("root")
            .with_child(
                Element::new("a")
                    .with_attr("id", "1")
                    .with_child(Element::new("b").with_attr("id", "2")),
            )
            .with_child(Element::new("b").with_attr("id", "3"))
    }

    #[test]
    fn test_attributes_keep_position() {
        let mut e = Element::new("x").with_attr("a", "1").with_attr("b", "2");
        e.set_attr("a", "3");
        assert_eq!(e.attributes[0].value, "3");
        assert_eq!(e.remove_attr("b").as_deref(), Some("2"));
        assert!(!e.has_attr("b"));
    }

    #[test]
    fn test_numeric_attributes() {
        let e = Element::new("x")
            .with_attr("f", "12.5")
            .with_attr("empty", "")
            .with_attr("bad", "abc");
        assert_eq!(e.attr_f64("f").unwrap(), Some(12.5));
        assert_eq!(e.attr_f64("empty").unwrap(), None);
        assert_eq!(e.attr_i64("missing").unwrap(), None);
        assert!(e.attr_i64("bad").is_err());
    }

    #[test]
    fn test_descendants_in_document_order() {
        let root = sample();
        let ids: Vec<_> = root.descendants().filter_map(|e| e.attr("id")).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(root.count_descendants("b"), 2);
    }

    #[test]
    fn test_paths() {
        let mut root = sample();
        let paths = root.descendant_paths(&[]);
        assert_eq!(paths, vec![vec![0], vec![0, 0], vec![1]]);
        assert_eq!(root.get_path(&[0, 0]).and_then(|e| e.attr("id")), Some("2"));
        root.get_path_mut(&[1]).unwrap().set_attr("id", "9");
        assert_eq!(root.get_path(&[1]).and_then(|e| e.attr("id")), Some("9"));
        assert!(root.get_path(&[5]).is_none());
    }

    #[test]
    fn test_walk_mut_visits_all() {
        let mut root = sample();
        let mut count = 0;
        root.walk_mut(&mut |e| {
            e.set_attr("seen", "yes");
            count += 1;
        });
        assert_eq!(count, 4);
        assert!(root.descendants().all(|e| e.attr("seen") == Some("yes")));
    }
}
