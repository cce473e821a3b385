//! Problem definition and data structures for the tonnage-weighted CVRP.

use crate::error::SolverError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

/// Node ID reserved for the depot.
pub const DEPOT: usize = 0;

/// Square, symmetric distance matrix indexed by node ID.
pub type DistanceMatrix = Vec<Vec<f64>>;

/// Represents a node (customer or depot) in the CVRP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub demand: f64,
}

impl Node {
    /// Create a new node.
    pub fn new(id: usize, x: f64, y: f64, demand: f64) -> Self {
        Node { id, x, y, demand }
    }

    /// Whether this node is the depot.
    pub fn is_depot(&self) -> bool {
        self.id == DEPOT
    }

    /// Calculate the Euclidean distance between two nodes.
    pub fn distance(&self, other: &Node) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Represents a tonnage-weighted CVRP instance.
///
/// `nodes[i].id == i` holds for every node, so node IDs double as indices into
/// `nodes` and `distance_matrix`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub name: String,
    pub nodes: Vec<Node>,
    pub vehicle_capacity: f64,
    /// Weight of an unloaded vehicle, carried on every arc of the tonnage cost.
    pub empty_vehicle_weight: f64,
    pub distance_matrix: DistanceMatrix,
}

impl Problem {
    /// Create a new problem and compute its distance matrix.
    pub fn new(
        name: String,
        nodes: Vec<Node>,
        vehicle_capacity: f64,
        empty_vehicle_weight: f64,
    ) -> Self {
        let distance_matrix = Self::compute_distance_matrix(&nodes);

        Problem {
            name,
            nodes,
            vehicle_capacity,
            empty_vehicle_weight,
            distance_matrix,
        }
    }

    /// Distance between two node IDs.
    #[inline]
    pub fn get_distance(&self, from: usize, to: usize) -> f64 {
        self.distance_matrix[from][to]
    }

    /// Demand of a node ID.
    #[inline]
    pub fn demand(&self, node: usize) -> f64 {
        self.nodes[node].demand
    }

    /// Get the number of customers (excluding the depot).
    pub fn get_customer_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Customer IDs in ascending order.
    pub fn customers(&self) -> impl Iterator<Item = usize> + Clone + '_ {
        self.nodes.iter().filter(|n| !n.is_depot()).map(|n| n.id)
    }

    /// Sum of all customer demands.
    pub fn total_demand(&self) -> f64 {
        self.nodes.iter().map(|n| n.demand).sum()
    }

    /// Generate the full distance matrix for all nodes.
    fn compute_distance_matrix(nodes: &[Node]) -> DistanceMatrix {
        let n = nodes.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let d = nodes[i].distance(&nodes[j]);
                matrix[i][j] = d;
                matrix[j][i] = d;
            }
        }

        matrix
    }

    /// Load a problem from a file.
    ///
    /// The format is comma separated:
    ///
    /// ```text
    /// CAPACITY,8
    /// EMPTY_VEHICLE_WEIGHT,6
    /// CUSTOMERS,250
    /// NODES INFO
    /// ID,XCOORD,YCOORD,DEMAND
    /// 0,50,50,0
    /// 1,3,49,0.5
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SolverError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "instance".to_string());

        Self::from_reader(name, io::BufReader::new(file))
    }

    /// Parse a problem from any buffered reader.
    pub fn from_reader<R: BufRead>(name: String, reader: R) -> Result<Self, SolverError> {
        let mut vehicle_capacity: Option<f64> = None;
        let mut empty_vehicle_weight: f64 = 0.0;
        let mut declared_customers = None;
        let mut nodes = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with("ID") || line.starts_with("NODES INFO") {
                continue;
            }

            let parts: Vec<&str> = line.split(',').map(str::trim).collect();

            match parts[0] {
                "CAPACITY" => vehicle_capacity = Some(parse_field(&parts, 1, line_no)?),
                "EMPTY_VEHICLE_WEIGHT" => empty_vehicle_weight = parse_field(&parts, 1, line_no)?,
                "CUSTOMERS" => {
                    declared_customers = Some(parse_field::<usize>(&parts, 1, line_no)?)
                }
                _ => {
                    // The depot row may omit its demand.
                    let fields = if nodes.is_empty() { 3 } else { 4 };
                    if parts.len() < fields {
                        return Err(SolverError::Parse {
                            line: line_no,
                            message: format!("expected `id,x,y,demand`, found `{}`", line),
                        });
                    }
                    let id: usize = parse_field(&parts, 0, line_no)?;
                    let x: f64 = parse_field(&parts, 1, line_no)?;
                    let y: f64 = parse_field(&parts, 2, line_no)?;
                    let demand: f64 = if parts.len() > 3 {
                        parse_field(&parts, 3, line_no)?
                    } else {
                        0.0
                    };

                    if id != nodes.len() {
                        return Err(SolverError::Parse {
                            line: line_no,
                            message: format!("expected node id {}, found {}", nodes.len(), id),
                        });
                    }
                    if demand < 0.0 {
                        return Err(SolverError::Parse {
                            line: line_no,
                            message: format!("negative demand {} for node {}", demand, id),
                        });
                    }

                    nodes.push(Node::new(id, x, y, demand));
                }
            }
        }

        let vehicle_capacity = vehicle_capacity
            .ok_or_else(|| SolverError::InvalidInstance("missing CAPACITY line".to_string()))?;

        if nodes.is_empty() {
            return Err(SolverError::InvalidInstance("no depot node".to_string()));
        }
        if nodes[DEPOT].demand != 0.0 {
            return Err(SolverError::InvalidInstance(
                "depot must have zero demand".to_string(),
            ));
        }
        if let Some(expected) = declared_customers {
            if expected != nodes.len() - 1 {
                return Err(SolverError::InvalidInstance(format!(
                    "declared {} customers but found {}",
                    expected,
                    nodes.len() - 1
                )));
            }
        }

        Ok(Problem::new(name, nodes, vehicle_capacity, empty_vehicle_weight))
    }
}

fn parse_field<T: std::str::FromStr>(
    parts: &[&str],
    index: usize,
    line: usize,
) -> Result<T, SolverError> {
    let raw = parts.get(index).ok_or_else(|| SolverError::Parse {
        line,
        message: format!("missing field {}", index),
    })?;

    raw.parse::<T>().map_err(|_| SolverError::Parse {
        line,
        message: format!("cannot parse `{}`", raw),
    })
}
