use roxmltree::Node;

use crate::model::{Row, Table};

/// Flattens the element tree below `root` into a [`Table`].
///
/// Every element child of `root` becomes one row. Within a row, elements
/// without element children are leaves and contribute `(tag, text)`; any
/// other element is descended into and its own tag is dropped. Columns are
/// registered in first-seen order across the whole document. A leaf tag that
/// repeats inside one row keeps the last value.
pub fn flatten(root: Node<'_, '_>) -> Table {
    let mut builder = TableBuilder::new();

    for record in root.children().filter(Node::is_element) {
        let mut row = Row::new();
        builder.collect_leaves(record, &mut row);
        builder.rows.push(row);
    }

    builder.into_table()
}

/// Returns the table of a document without any top-level rows.
pub fn empty_table() -> Table {
    TableBuilder::new().into_table()
}

struct TableBuilder {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TableBuilder {
    fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    fn collect_leaves(&mut self, element: Node<'_, '_>, row: &mut Row) {
        for child in element.children().filter(Node::is_element) {
            if is_leaf(child) {
                let column = child.tag_name().name();
                self.register(column);
                row.insert(column, leaf_text(child));
            } else {
                self.collect_leaves(child, row);
            }
        }
    }

    fn register(&mut self, column: &str) {
        if !self.columns.iter().any(|known| known == column) {
            self.columns.push(column.to_string());
        }
    }

    fn into_table(self) -> Table {
        Table::new(self.columns, self.rows)
    }
}

fn is_leaf(node: Node<'_, '_>) -> bool {
    !node.children().any(|child| child.is_element())
}

// Text split by comments or processing instructions is joined back together.
fn leaf_text(node: Node<'_, '_>) -> Option<String> {
    let mut parts = node
        .children()
        .filter(Node::is_text)
        .filter_map(|child| child.text());
    let first = parts.next()?;
    Some(parts.fold(first.to_string(), |mut text, part| {
        text.push_str(part);
        text
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cell;

    fn flatten_str(source: &str) -> Table {
        let document = roxmltree::Document::parse(source).expect("well-formed XML");
        flatten(document.root_element())
    }

    #[test]
    fn leaves_below_nested_elements_become_columns() {
        let table = flatten_str(
            "<root><item><name>a</name><meta><state>NEW</state><tags><tag>x</tag></tags></meta></item></root>",
        );
        assert_eq!(table.columns(), ["name", "state", "tag"]);
        assert_eq!(table.cell(0, "tag"), Some(Cell::Text("x")));
    }

    #[test]
    fn duplicate_leaves_in_one_row_keep_the_last_value() {
        let table = flatten_str("<root><item><v>1</v><v>2</v></item></root>");
        assert_eq!(table.columns(), ["v"]);
        assert_eq!(table.cell(0, "v"), Some(Cell::Text("2")));
    }

    #[test]
    fn leaf_rows_have_no_values() {
        let table = flatten_str("<root><item>loose text</item><item><a>1</a></item></root>");
        assert_eq!(table.row_count(), 2);
        assert!(table.rows()[0].is_empty());
        assert_eq!(table.cell(0, "a"), Some(Cell::Missing));
    }

    #[test]
    fn comments_and_processing_instructions_do_not_affect_structure() {
        let table = flatten_str(
            "<root><!-- header --><item><?pi data?><name><!-- c -->x</name></item></root>",
        );
        assert_eq!(table.columns(), ["name"]);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.cell(0, "name"), Some(Cell::Text("x")));
    }

    #[test]
    fn textless_leaves_are_empty_not_missing() {
        let table = flatten_str("<root><item><name/><value></value></item></root>");
        assert_eq!(table.cell(0, "name"), Some(Cell::Empty));
        assert_eq!(table.cell(0, "value"), Some(Cell::Empty));
    }

    #[test]
    fn namespaced_tags_use_their_local_name() {
        let table =
            flatten_str(r#"<root xmlns:p="urn:p"><p:item><p:name>a</p:name></p:item></root>"#);
        assert_eq!(table.columns(), ["name"]);
    }
}
