//! GraphViz DOT export (spec.md §6, `[ADDED]`): an external collaborator
//! consuming only the `outgoingTransitions`/`incomingTransitions` iterable
//! contract spec.md §6 describes as "sufficient to render a graph". Text
//! generation only — no layout, no rendering, no GraphViz dependency.

use std::io;
use std::io::Write;

use crate::builder::DawgBuilder;
use crate::node::NodeId;
use crate::symbol::Symbol;

/// Writes `builder`'s mutable graph as DOT source to `out`.
///
/// Accept nodes are drawn as double circles. Edges carry their label
/// rendered as a decimal code unit (the automaton has no notion of a
/// display charset beyond `Symbol` itself); `label_as` lets a caller
/// substitute a friendlier rendering (e.g. the `char` the code unit
/// decodes to) without this module needing to know about UTF-16.
pub fn write_dot(
	builder: &DawgBuilder,
	label_as: impl Fn(Symbol) -> String,
	out: &mut impl Write,
) -> io::Result<()> {
	write_dot_impl(builder, label_as, out, false)
}

/// As [`write_dot`], but also draws incoming edges as dashed reverse arrows
/// — only meaningful when `builder` was built `with_incoming: true`; a
/// no-op addition otherwise (the reverse edges coincide with the forward
/// ones already drawn, so nothing new is emitted).
pub fn write_dot_with_incoming(
	builder: &DawgBuilder,
	label_as: impl Fn(Symbol) -> String,
	out: &mut impl Write,
) -> io::Result<()> {
	write_dot_impl(builder, label_as, out, builder.has_incoming_index())
}

fn write_dot_impl(
	builder: &DawgBuilder,
	label_as: impl Fn(Symbol) -> String,
	out: &mut impl Write,
	draw_incoming: bool,
) -> io::Result<()> {
	writeln!(out, "digraph dawg {{")?;
	writeln!(out, "\trankdir=LR;")?;

	let source = builder.source();
	let mut visited = std::collections::HashSet::new();
	let mut stack = vec![source];
	visited.insert(source);
	let mut order = Vec::new();
	while let Some(node) = stack.pop() {
		order.push(node);
		for (_, child) in builder.outgoing_transitions(node) {
			if visited.insert(child) {
				stack.push(child);
			}
		}
	}

	let ids: std::collections::HashMap<NodeId, usize> =
		order.iter().enumerate().map(|(i, &n)| (n, i)).collect();

	for &node in &order {
		let shape = if builder.is_accept(node) { "doublecircle" } else { "circle" };
		writeln!(out, "\t{} [shape={shape}, label=\"\"];", ids[&node])?;
	}
	for &node in &order {
		for (label, child) in builder.outgoing_transitions(node) {
			writeln!(out, "\t{} -> {} [label=\"{}\"];", ids[&node], ids[&child], escape(&label_as(label)))?;
		}
	}

	if draw_incoming {
		for &node in &order {
			let Some(incoming) = builder.incoming_transitions(node) else {
				break;
			};
			for (label, pred) in incoming {
				let Some(&pred_id) = ids.get(&pred) else {
					continue;
				};
				writeln!(
					out,
					"\t{} -> {} [label=\"{}\", style=dashed, constraint=false];",
					ids[&node],
					pred_id,
					escape(&label_as(label))
				)?;
			}
		}
	}

	writeln!(out, "}}")?;
	Ok(())
}

fn escape(s: &str) -> String {
	s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::symbol::to_symbols;

	#[test]
	fn writes_valid_looking_dot_source() {
		let mut b = DawgBuilder::new();
		for w in ["a", "xe", "xes", "xs"] {
			b.add(&to_symbols(w));
		}
		let mut buf = Vec::new();
		write_dot(&b, |c| char::from_u32(c as u32).map(|c| c.to_string()).unwrap_or_default(), &mut buf).unwrap();
		let text = String::from_utf8(buf).unwrap();
		assert!(text.starts_with("digraph dawg {"));
		assert!(text.trim_end().ends_with('}'));
		assert!(text.contains("doublecircle"));
		assert!(text.contains("label=\"x\""));
	}

	#[test]
	fn with_incoming_adds_dashed_reverse_edges() {
		let mut b = crate::builder::DawgBuilder::with_config(crate::builder::BuilderConfig { with_incoming: true });
		for w in ["a", "xe"] {
			b.add(&to_symbols(w));
		}
		let mut buf = Vec::new();
		write_dot_with_incoming(&b, |c| char::from_u32(c as u32).map(|c| c.to_string()).unwrap_or_default(), &mut buf)
			.unwrap();
		let text = String::from_utf8(buf).unwrap();
		assert!(text.contains("style=dashed"));
	}
}
