//! Progress checkpoints reported while a job is processing.

/// A fixed (message, percent) pair emitted during processing.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    /// Operator-facing status line.
    pub message: &'static str,
    /// Progress percentage written to the job ledger.
    pub percent: u8,
}

/// The checkpoint sequence, emitted in this exact order before the rewrite
/// passes run. Progress through a job is therefore monotonically
/// non-decreasing.
pub const CHECKPOINTS: [Checkpoint; 11] = [
    Checkpoint { message: "Analisando estrutura do firmware...", percent: 5 },
    Checkpoint { message: "Identificando assinaturas de segurança...", percent: 15 },
    Checkpoint { message: "Mapeando tabelas de verificação...", percent: 25 },
    Checkpoint { message: "Localizando restrições de toner OEM...", percent: 35 },
    Checkpoint { message: "Desabilitando verificações de autenticidade...", percent: 45 },
    Checkpoint { message: "Neutralizando contadores de toner...", percent: 55 },
    Checkpoint { message: "Removendo limitações de chip...", percent: 65 },
    Checkpoint { message: "Aplicando patches de compatibilidade universal...", percent: 75 },
    Checkpoint { message: "Recalculando checksums de segurança...", percent: 85 },
    Checkpoint { message: "Validando integridade do firmware modificado...", percent: 95 },
    Checkpoint { message: "Finalizando e otimizando...", percent: 100 },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_percentages_increase() {
        let mut previous = 0;
        for checkpoint in CHECKPOINTS {
            assert!(checkpoint.percent > previous);
            previous = checkpoint.percent;
        }
        assert_eq!(previous, 100);
    }

    #[test]
    fn test_checkpoint_sequence_shape() {
        assert_eq!(CHECKPOINTS.len(), 11);
        assert_eq!(CHECKPOINTS[0].percent, 5);
        assert_eq!(CHECKPOINTS[0].message, "Analisando estrutura do firmware...");
        assert_eq!(CHECKPOINTS[10].message, "Finalizando e otimizando...");
    }
}
