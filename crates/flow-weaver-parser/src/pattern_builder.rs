//! Pattern construction (`spec.md §4.D`): same shape as a workflow minus
//! start/exit port synthesis; `IN`/`OUT` remain abstract pseudo-nodes.

use flow_weaver_ast::{Pattern, PortDefinition, PortKind};

use crate::error::Result;
use crate::port_order::assign_port_order;
use crate::tags::Tag;

pub fn build_pattern(name: &str, source_file: &str, tags: &[Tag]) -> Result<Pattern> {
    let mut pattern = Pattern::new(name, source_file);

    for t in tags {
        match t {
            Tag::Name(n) => pattern.name = n.clone(),
            Tag::Description(d) => pattern.description = Some(d.clone()),
            Tag::Node(n) => {
                pattern.instances.push(flow_weaver_ast::NodeInstance::new(n.id.clone(), n.type_name.clone()));
            }
            Tag::Connect(c) => {
                pattern.connections.push(flow_weaver_ast::Connection::new(c.from.clone(), c.to.clone()));
            }
            Tag::Port { side, name } => {
                let port = (name.clone(), PortDefinition::new(PortKind::Any));
                if side == "IN" {
                    pattern.input_ports.push(port);
                } else if side == "OUT" {
                    pattern.output_ports.push(port);
                }
            }
            _ => {}
        }
    }

    assign_port_order(&mut pattern.input_ports, |_| false);
    assign_port_order(&mut pattern.output_ports, |_| false);

    Ok(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_pattern_with_abstract_ports() {
        let tags = vec![
            Tag::Port { side: "IN".to_string(), name: "value".to_string() },
            Tag::Port { side: "OUT".to_string(), name: "result".to_string() },
        ];
        let pattern = build_pattern("Retry", "retry.ts", &tags).unwrap();
        assert_eq!(pattern.input_ports[0].0, "value");
        assert_eq!(pattern.output_ports[0].0, "result");
    }
}
